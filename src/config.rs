//! Configuration for the random buffer cache.
//!
//! Defines the tunables shared by the cache, the refill scheduler and the
//! availability gate.

use core::fmt;
use core::time::Duration;

/// Largest buffer the cache accepts.
///
/// Keeps `capacity` representable as `u32` for the scheduler's delay ratio.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Longest accepted base delay.
///
/// A full buffer waits twice this; keeps every computed delay far from `Duration` overflow.
pub const MAX_BASE_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Largest seed fetched from the TRNG per refill cycle.
pub const MAX_SEED_SIZE: usize = 64;

/// Cache configuration.
///
/// Populated by the embedding application, or taken from [`Default`] which
/// carries the reference values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Buffer size in bytes. Also the largest single extraction.
    pub capacity: usize,

    /// Bytes of true entropy fetched per refill.
    pub seed_size: usize,

    /// Minimum scheduler cadence. A full buffer is re-checked after twice this.
    pub base_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 2048,
            seed_size: 32,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl CacheConfig {
    /// Checks the configuration for values the cache cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge);
        }
        if self.seed_size == 0 {
            return Err(ConfigError::ZeroSeed);
        }
        if self.seed_size > MAX_SEED_SIZE {
            return Err(ConfigError::SeedTooLarge);
        }
        if self.base_delay.is_zero() {
            return Err(ConfigError::ZeroDelay);
        }
        if self.base_delay > MAX_BASE_DELAY {
            return Err(ConfigError::DelayTooLarge);
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `capacity` is zero.
    ZeroCapacity,
    /// `capacity` exceeds [`MAX_CAPACITY`].
    CapacityTooLarge,
    /// `seed_size` is zero.
    ZeroSeed,
    /// `seed_size` exceeds [`MAX_SEED_SIZE`].
    SeedTooLarge,
    /// `base_delay` is zero.
    ZeroDelay,
    /// `base_delay` exceeds [`MAX_BASE_DELAY`].
    DelayTooLarge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "buffer capacity must be non-zero"),
            ConfigError::CapacityTooLarge => {
                write!(f, "buffer capacity exceeds {} bytes", MAX_CAPACITY)
            }
            ConfigError::ZeroSeed => write!(f, "seed size must be non-zero"),
            ConfigError::SeedTooLarge => write!(f, "seed size exceeds {} bytes", MAX_SEED_SIZE),
            ConfigError::ZeroDelay => write!(f, "base delay must be non-zero"),
            ConfigError::DelayTooLarge => {
                write!(f, "base delay exceeds {:?}", MAX_BASE_DELAY)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 2048);
        assert_eq!(config.seed_size, 32);
        assert_eq!(config.base_delay, Duration::from_millis(500));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = CacheConfig::default();

        let config = CacheConfig { capacity: 0, ..base };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let config = CacheConfig { capacity: MAX_CAPACITY + 1, ..base };
        assert_eq!(config.validate(), Err(ConfigError::CapacityTooLarge));

        let config = CacheConfig { seed_size: 0, ..base };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSeed));

        let config = CacheConfig { seed_size: MAX_SEED_SIZE + 1, ..base };
        assert_eq!(config.validate(), Err(ConfigError::SeedTooLarge));

        // A buffer smaller than the seed is still fine
        let config = CacheConfig { capacity: 8, ..base };
        assert_eq!(config.validate(), Ok(()));

        let config = CacheConfig { base_delay: Duration::ZERO, ..base };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDelay));

        let config = CacheConfig { base_delay: MAX_BASE_DELAY, ..base };
        assert_eq!(config.validate(), Ok(()));

        let config = CacheConfig { base_delay: Duration::from_secs(u64::MAX / 2), ..base };
        assert_eq!(config.validate(), Err(ConfigError::DelayTooLarge));
    }
}
