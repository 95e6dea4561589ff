//! Availability Gate.
//!
//! Probes for the required primitives, allocates the cache, arms the refill
//! scheduler and only then flips the availability flag. A machine without the
//! primitives is a normal outcome, not an error: the service comes up disabled
//! and callers use their own fallback.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::cache::BufferCache;
use crate::config::{CacheConfig, ConfigError};
use crate::drng::Drng;
use crate::entropy::EntropySource;
use crate::platform::{HardwareProbe, PlatformProbe};
use crate::scheduler::worker::SchedulerHandle;
use crate::scheduler::{RefillScheduler, RefillStats};

/// Errors reported while bringing the service up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The configuration was rejected.
    InvalidConfig(ConfigError),
    /// The buffer could not be allocated.
    OutOfMemory,
    /// The refill thread could not be started.
    SpawnFailed,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
            InitError::OutOfMemory => write!(f, "Out of memory allocating the random buffer"),
            InitError::SpawnFailed => write!(f, "Failed to start the refill thread"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::InvalidConfig(e)
    }
}

/// The random buffer service: availability flag, cache and its scheduler.
pub struct ArchRandom {
    available: AtomicBool,
    cache: Option<Arc<BufferCache>>,
    scheduler: Option<SchedulerHandle>,
}

impl ArchRandom {
    /// A service that never serves bytes.
    pub fn disabled() -> Self {
        Self {
            available: AtomicBool::new(false),
            cache: None,
            scheduler: None,
        }
    }

    /// Brings the service up on top of the given primitives.
    ///
    /// If `probe` reports a required subfunction missing, nothing is allocated and
    /// the returned service is disabled. Otherwise the cache is allocated, the
    /// scheduler is armed for its first fire after `base_delay`, and the service
    /// becomes available. The cache stays empty until that first fire.
    ///
    /// # Errors
    /// * `InitError::InvalidConfig` if `config` fails validation.
    /// * `InitError::OutOfMemory` if the buffer cannot be allocated.
    /// * `InitError::SpawnFailed` if the refill thread cannot be started.
    pub fn probe_and_init<P, T, D>(
        config: &CacheConfig,
        probe: &P,
        trng: T,
        drng: D,
    ) -> Result<Self, InitError>
    where
        P: HardwareProbe + ?Sized,
        T: EntropySource + Send + 'static,
        D: Drng + Send + 'static,
    {
        config.validate()?;

        if let Some(function) = probe.missing() {
            log::info!("Random buffer disabled: {} not available", function);
            return Ok(Self::disabled());
        }

        let cache = BufferCache::new(config.capacity).map_err(|_| {
            log::error!("Cannot allocate {} byte random buffer", config.capacity);
            InitError::OutOfMemory
        })?;
        let cache = Arc::new(cache);

        let scheduler = RefillScheduler::new(Arc::clone(&cache), config, trng, drng)
            .spawn()
            .map_err(|e| {
                log::error!("Cannot start refill thread: {}", e);
                InitError::SpawnFailed
            })?;

        let service = Self {
            available: AtomicBool::new(false),
            cache: Some(cache),
            scheduler: Some(scheduler),
        };
        service.available.store(true, Ordering::Release);

        log::info!(
            "Random buffer enabled: {} bytes, base delay {:?}",
            config.capacity,
            config.base_delay
        );
        Ok(service)
    }

    /// Brings the service up on this machine's hardware generator.
    ///
    /// Uses RDRAND as TRNG and BLAKE3 as DRNG; disabled on CPUs without RDRAND.
    pub fn probe_platform(config: &CacheConfig) -> Result<Self, InitError> {
        config.validate()?;

        if let Some(function) = PlatformProbe.missing() {
            log::info!("Random buffer disabled: {} not available", function);
            return Ok(Self::disabled());
        }

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        if let Some(trng) = crate::entropy::rdrand::RdRandSource::new() {
            return Self::probe_and_init(config, &PlatformProbe, trng, crate::drng::Blake3Drng::new());
        }

        Ok(Self::disabled())
    }

    /// Whether the cache is allocated and being refilled.
    ///
    /// Callers are expected to check this before calling [`extract`](Self::extract).
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Copies `out.len()` random bytes into `out` without blocking.
    ///
    /// `false` means "use another source"; see [`BufferCache::extract`].
    pub fn extract(&self, out: &mut [u8]) -> bool {
        match &self.cache {
            Some(cache) if self.is_available() => cache.extract(out),
            _ => false,
        }
    }

    /// Total bytes served since initialization.
    pub fn served_byte_count(&self) -> u64 {
        self.cache.as_ref().map_or(0, |cache| cache.served_byte_count())
    }

    pub fn cache(&self) -> Option<&Arc<BufferCache>> {
        self.cache.as_ref()
    }

    /// Stops the refill thread. Only meaningful for owned, non-global instances.
    ///
    /// Returns `None` for a disabled service.
    pub fn shutdown(mut self) -> Option<thread::Result<RefillStats>> {
        self.scheduler.take().map(SchedulerHandle::shutdown)
    }
}

impl fmt::Debug for ArchRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchRandom")
            .field("available", &self.is_available())
            .field("capacity", &self.cache.as_ref().map(|c| c.capacity()))
            .field("served", &self.served_byte_count())
            .finish()
    }
}
