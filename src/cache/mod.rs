//! Random Buffer Cache.
//!
//! Holds a fixed-capacity buffer of DRNG output and serves it to callers
//! without ever blocking them. Bytes are taken from the tail of the remaining
//! region, so every successful extraction shrinks it and no byte is handed out
//! twice within one fill cycle.
//!
//! # Concurrency
//! - The buffer and its remaining-bytes cursor sit behind one spin lock.
//! - `extract` only ever *tries* the lock. A busy lock is a miss, exactly like
//!   an exhausted buffer; the caller falls back to another source.
//! - The refill scheduler takes the lock blocking, off the caller's path.
//!
//! # Security
//! - **Zeroization**: the buffer lives in a `Zeroizing` container and each served
//!   range is wiped as soon as it has been copied out.

pub mod counter;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use spin::{Mutex, MutexGuard};
use zeroize::{Zeroize, Zeroizing};

use self::counter::ServedCounter;

/// Buffer contents and the remaining-bytes cursor, mutated only as a unit.
pub(crate) struct Pool {
    /// DRNG output. Bytes at `[0, remaining)` are still unserved.
    pub(crate) buf: Zeroizing<Vec<u8>>,
    /// Unserved bytes. `capacity` right after a refill, `0` when exhausted.
    pub(crate) remaining: usize,
}

impl Pool {
    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Marks the whole buffer as unserved. Called once the DRNG has rewritten it.
    pub(crate) fn mark_full(&mut self) {
        self.remaining = self.buf.len();
    }
}

/// Fixed-capacity random byte cache.
pub struct BufferCache {
    pool: Mutex<Pool>,
    capacity: usize,
    served: ServedCounter,
}

impl BufferCache {
    /// Allocates an empty cache of `capacity` bytes.
    ///
    /// The cache starts exhausted; nothing is served until the first refill.
    ///
    /// # Errors
    /// Returns the allocator's `TryReserveError` if the buffer cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.resize(capacity, 0u8);

        Ok(Self {
            pool: Mutex::new(Pool {
                buf: Zeroizing::new(buf),
                remaining: 0,
            }),
            capacity,
            served: ServedCounter::new(),
        })
    }

    /// Copies `out.len()` random bytes into `out` without blocking.
    ///
    /// Returns `false` and leaves `out` untouched when the request exceeds the
    /// capacity, when fewer bytes remain than requested, or when the lock is
    /// currently held by another extractor or the refill. The three cases are
    /// deliberately indistinguishable.
    pub fn extract(&self, out: &mut [u8]) -> bool {
        let n = out.len();
        if n > self.capacity {
            return false;
        }

        let Some(mut pool) = self.pool.try_lock() else {
            return false;
        };

        if pool.remaining < n {
            return false;
        }

        let end = pool.remaining;
        let start = end - n;
        out.copy_from_slice(&pool.buf[start..end]);
        pool.buf[start..end].zeroize();
        pool.remaining = start;
        self.served.add(n as u64);
        true
    }

    /// Returns the number of unserved bytes.
    ///
    /// Takes the lock blocking; meant for observability, not the hot path.
    pub fn remaining(&self) -> usize {
        self.pool.lock().remaining
    }

    /// Buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes handed to callers since the cache was created.
    pub fn served_byte_count(&self) -> u64 {
        self.served.get()
    }

    /// Acquires the pool lock, spinning until it is free.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Pool> {
        self.pool.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fills the buffer with `buf[i] = i as u8` and marks it full.
    fn fill_sequential(cache: &BufferCache) {
        let mut pool = cache.lock();
        for (i, byte) in pool.buf.iter_mut().enumerate() {
            *byte = i as u8;
        }
        pool.mark_full();
    }

    #[test]
    fn test_starts_exhausted() {
        let cache = BufferCache::new(16).unwrap();
        assert_eq!(cache.capacity(), 16);
        assert_eq!(cache.remaining(), 0);

        let mut out = [0u8; 1];
        assert!(!cache.extract(&mut out));
        assert_eq!(cache.served_byte_count(), 0);
    }

    #[test]
    fn test_small_cache_scenario() {
        let cache = BufferCache::new(8).unwrap();
        fill_sequential(&cache);
        assert_eq!(cache.remaining(), 8);

        let mut three = [0u8; 3];
        assert!(cache.extract(&mut three));
        assert_eq!(three, [5, 6, 7]);
        assert_eq!(cache.remaining(), 5);

        let mut six = [0xFFu8; 6];
        assert!(!cache.extract(&mut six));
        assert_eq!(six, [0xFF; 6]);
        assert_eq!(cache.remaining(), 5);

        let mut five = [0u8; 5];
        assert!(cache.extract(&mut five));
        assert_eq!(five, [0, 1, 2, 3, 4]);
        assert_eq!(cache.remaining(), 0);

        assert_eq!(cache.served_byte_count(), 8);
    }

    #[test]
    fn test_oversized_request_touches_nothing() {
        let cache = BufferCache::new(8).unwrap();
        fill_sequential(&cache);

        let mut out = [0xEEu8; 9];
        assert!(!cache.extract(&mut out));
        assert_eq!(out, [0xEE; 9]);
        assert_eq!(cache.remaining(), 8);
        assert_eq!(cache.served_byte_count(), 0);

        let pool = cache.lock();
        assert_eq!(&pool.buf[..], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_served_bytes_are_wiped() {
        let cache = BufferCache::new(8).unwrap();
        fill_sequential(&cache);

        let mut out = [0u8; 4];
        assert!(cache.extract(&mut out));

        let pool = cache.lock();
        assert_eq!(&pool.buf[..4], &[0, 1, 2, 3]);
        assert_eq!(&pool.buf[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_contended_lock_is_a_miss() {
        let cache = BufferCache::new(8).unwrap();
        fill_sequential(&cache);

        let guard = cache.lock();
        let mut out = [0u8; 1];
        assert!(!cache.extract(&mut out));
        drop(guard);

        assert!(cache.extract(&mut out));
        assert_eq!(out, [7]);
    }

    #[test]
    fn test_cumulative_requests_up_to_capacity() {
        let cache = BufferCache::new(64).unwrap();
        fill_sequential(&cache);

        let mut seen = [false; 64];
        for n in [1usize, 7, 13, 20, 23] {
            let mut out = alloc::vec![0u8; n];
            assert!(cache.extract(&mut out));
            for &b in &out {
                assert!(!seen[b as usize], "byte index {} served twice", b);
                seen[b as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(cache.served_byte_count(), 64);
    }

    #[test]
    fn test_empty_request() {
        let cache = BufferCache::new(8).unwrap();
        let mut out = [0u8; 0];
        assert!(cache.extract(&mut out));
        assert_eq!(cache.served_byte_count(), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_concurrent_extractions_are_disjoint() {
        use std::vec::Vec;

        let cache = BufferCache::new(256).unwrap();
        fill_sequential(&cache);

        let results: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let cache = &cache;
                    s.spawn(move || {
                        let mut got = Vec::new();
                        let n = 1 + t % 4;
                        for _ in 0..10_000 {
                            let mut out = [0u8; 4];
                            if cache.extract(&mut out[..n]) {
                                got.extend_from_slice(&out[..n]);
                            }
                        }
                        got
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut seen = [false; 256];
        let mut total = 0u64;
        for got in &results {
            for &b in got {
                assert!(!seen[b as usize], "byte index {} served twice", b);
                seen[b as usize] = true;
            }
            total += got.len() as u64;
        }
        assert_eq!(cache.served_byte_count(), total);
        assert_eq!(cache.remaining() as u64, 256 - total);
    }
}
