//! True-random entropy sources.
//!
//! The refill cycle draws a small seed from one of these sources and lets the
//! DRNG expand it. Sources are slow and may fail; neither matters to callers of
//! the cache, who only ever see the already-expanded buffer.
//!
//! # Sources
//! - `rdrand`: on-chip hardware generator (x86 RDRAND).
//! - `jitter`: CPU timing jitter, an independent fallback when the cache misses.
//! - `health`: screening of fetched seeds against stuck or biased output.

pub mod health;
pub mod jitter;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod rdrand;

use core::fmt;

/// Error types for entropy collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// Source initialization failed.
    InitFailed,
    /// Failed to collect sufficient entropy bytes.
    CollectionFailed,
    /// Source is exhausted (e.g., fixed buffer).
    Exhausted,
    /// Health test failure (SP 800-90B).
    HealthTestFailed,
    /// Platform not supported.
    NotSupported,
}

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyError::InitFailed => write!(f, "Entropy source initialization failed"),
            EntropyError::CollectionFailed => write!(f, "Entropy collection failed"),
            EntropyError::Exhausted => write!(f, "Entropy source exhausted"),
            EntropyError::HealthTestFailed => write!(f, "Entropy health test failed"),
            EntropyError::NotSupported => write!(f, "Entropy source not supported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EntropyError {}

/// A source of true entropy (the TRNG half of the refill primitives).
pub trait EntropySource {
    /// Returns a unique identifier for the source.
    fn name(&self) -> &'static str;

    /// Fills `dest` with random bytes from the source.
    ///
    /// Synchronous; may be slow. A failure leaves the content of `dest`
    /// unspecified and the caller must not use it.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Returns the estimated entropy per byte (in bits, 0.0-8.0).
    fn entropy_estimate(&self) -> f64;
}

impl<S: EntropySource + ?Sized> EntropySource for alloc::boxed::Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill(dest)
    }

    fn entropy_estimate(&self) -> f64 {
        (**self).entropy_estimate()
    }
}
