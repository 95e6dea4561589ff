//! Refill Scheduler.
//!
//! A self-rearming periodic task that keeps the cache usably full. Each fire
//! takes the cache lock, refills the buffer if (and only if) it is exhausted,
//! and computes how long to wait before the next fire.
//!
//! # Cadence
//! The next delay is `base + base * remaining / capacity`: a full buffer is
//! re-checked after twice the base delay, a draining one proportionally sooner,
//! so exhaustion is noticed before extractors starve.
//!
//! # Failure
//! A refill that cannot obtain a usable seed is abandoned without touching the
//! cursor. The cache stays exhausted and the next fire simply tries again.
//!
//! The fire logic itself is runtime agnostic; `worker` drives it from a
//! dedicated thread when `std` is available.

#[cfg(feature = "std")]
pub mod worker;

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::time::Duration;

use zeroize::Zeroizing;

use crate::cache::BufferCache;
use crate::config::{CacheConfig, MAX_SEED_SIZE};
use crate::drng::Drng;
use crate::entropy::health::HealthTester;
use crate::entropy::{EntropyError, EntropySource};

/// Computes the delay until the next fire from the current fill level.
///
/// `base + base * remaining / capacity`, truncated to whole nanoseconds and
/// saturating at `Duration::MAX` instead of overflowing.
pub fn next_delay(base: Duration, remaining: usize, capacity: usize) -> Duration {
    if capacity == 0 {
        return base;
    }
    let remaining = remaining.min(capacity) as u128;
    let extra = base.as_nanos() * remaining / capacity as u128;
    base.saturating_add(Duration::from_nanos(u64::try_from(extra).unwrap_or(u64::MAX)))
}

/// Counters describing the scheduler's activity so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillStats {
    /// Fires executed.
    pub fires: u64,
    /// Fires that found the buffer exhausted and refilled it.
    pub refills: u64,
    /// Fires that found the buffer exhausted but could not refill it.
    pub failed_refills: u64,
}

/// TRNG + DRNG pair performing one refill cycle.
struct Refiller {
    trng: Box<dyn EntropySource + Send>,
    drng: Box<dyn Drng + Send>,
    health: HealthTester,
    seed_size: usize,
}

impl Refiller {
    /// Fetches a seed, screens it and expands it over `buf`.
    ///
    /// On error `buf` may be partially overwritten; the caller must not mark it full.
    fn refill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        let mut seed = Zeroizing::new([0u8; MAX_SEED_SIZE]);
        let seed = &mut seed[..self.seed_size];

        self.trng.fill(seed)?;
        self.health.check(seed)?;
        self.drng.seed(seed);
        self.drng.generate(buf)
    }
}

/// Periodic refill task for a [`BufferCache`].
pub struct RefillScheduler {
    cache: Arc<BufferCache>,
    refiller: Refiller,
    base_delay: Duration,
    stats: RefillStats,
}

impl RefillScheduler {
    /// Creates a scheduler for `cache` drawing seeds from `trng` and expanding them with `drng`.
    ///
    /// `config` must already be validated; its capacity is not consulted, the
    /// cache's own capacity is authoritative.
    ///
    /// Every seed is health screened, so a deterministic `trng` with repeated
    /// output (e.g. constant bytes) never refills the cache.
    pub fn new<T, D>(cache: Arc<BufferCache>, config: &CacheConfig, trng: T, drng: D) -> Self
    where
        T: EntropySource + Send + 'static,
        D: Drng + Send + 'static,
    {
        Self {
            cache,
            refiller: Refiller {
                trng: Box::new(trng),
                drng: Box::new(drng),
                health: HealthTester::new(),
                seed_size: config.seed_size.clamp(1, MAX_SEED_SIZE),
            },
            base_delay: config.base_delay,
            stats: RefillStats::default(),
        }
    }

    /// Delay before the very first fire.
    pub fn initial_delay(&self) -> Duration {
        self.base_delay
    }

    /// Runs one fire and returns the delay until the next one.
    ///
    /// Blocks on the cache lock; must not be called from an extractor's path.
    pub fn on_fire(&mut self) -> Duration {
        self.stats.fires += 1;

        let mut pool = self.cache.lock();
        if pool.is_exhausted() {
            match self.refiller.refill(&mut pool.buf[..]) {
                Ok(()) => {
                    pool.mark_full();
                    self.stats.refills += 1;
                }
                Err(e) => {
                    self.stats.failed_refills += 1;
                    log::warn!(
                        "Refill abandoned ({} -> {}): {}",
                        self.refiller.trng.name(),
                        self.refiller.drng.name(),
                        e
                    );
                }
            }
        }
        let delay = next_delay(self.base_delay, pool.remaining, self.cache.capacity());
        drop(pool);

        log::debug!("Refill check done, next in {:?}", delay);
        delay
    }

    /// The cache this scheduler refills.
    pub fn cache(&self) -> &Arc<BufferCache> {
        &self.cache
    }

    pub fn stats(&self) -> RefillStats {
        self.stats
    }
}
