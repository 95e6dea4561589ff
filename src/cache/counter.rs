//! Served byte accounting.
//!
//! Counts every byte handed out by the cache. The counter is monotonic: it is
//! only ever advanced, never reset, and is safe to read from any thread.

use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic count of bytes served to callers.
#[derive(Debug, Default)]
pub struct ServedCounter {
    bytes: AtomicU64,
}

impl ServedCounter {
    pub const fn new() -> Self {
        Self {
            bytes: AtomicU64::new(0),
        }
    }

    /// Advances the counter by `amount` bytes.
    #[inline]
    pub fn add(&self, amount: u64) {
        self.bytes.fetch_add(amount, Ordering::Relaxed);
    }

    /// Returns the number of bytes served so far.
    #[inline]
    pub fn get(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}
