//! `rand_core` adapter over the cache.
//!
//! Serves from the cache when it can and from an independent fallback source
//! when it cannot, so it never waits for a refill. Requests larger than the
//! cache capacity are split into capacity-sized chunks.

use alloc::sync::Arc;
use core::num::NonZeroU32;

use rand_core::{impls, CryptoRng, Error, RngCore};

use crate::cache::BufferCache;
use crate::entropy::jitter::JitterSource;
use crate::entropy::{EntropyError, EntropySource};

/// First `rand_core` error code used for fallback failures.
const ERROR_CODE_BASE: NonZeroU32 = match NonZeroU32::new(Error::CUSTOM_START) {
    Some(code) => code,
    None => panic!("CUSTOM_START is non-zero"),
};

fn rand_error(e: EntropyError) -> Error {
    Error::from(ERROR_CODE_BASE.saturating_add(e as u32))
}

/// Random number generator drawing from a [`BufferCache`].
pub struct CacheRng<F = JitterSource> {
    cache: Arc<BufferCache>,
    fallback: F,
}

impl CacheRng<JitterSource> {
    /// Uses CPU jitter as fallback.
    pub fn new(cache: Arc<BufferCache>) -> Self {
        Self::with_fallback(cache, JitterSource::new())
    }
}

impl<F: EntropySource> CacheRng<F> {
    pub fn with_fallback(cache: Arc<BufferCache>, fallback: F) -> Self {
        Self { cache, fallback }
    }

    pub fn cache(&self) -> &Arc<BufferCache> {
        &self.cache
    }
}

impl<F: EntropySource> RngCore for CacheRng<F> {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    /// # Panics
    /// If both the cache and the fallback source fail.
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.try_fill_bytes(dest) {
            panic!("CacheRng: cache miss and fallback failed: {}", e);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        let chunk_size = self.cache.capacity().max(1);
        for chunk in dest.chunks_mut(chunk_size) {
            if !self.cache.extract(chunk) {
                self.fallback.fill(chunk).map_err(rand_error)?;
            }
        }
        Ok(())
    }
}

impl<F: EntropySource> CryptoRng for CacheRng<F> {}
