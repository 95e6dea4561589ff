//! Process-wide instance.
//!
//! Installed at most once; every later `init` returns the instance already in
//! place. Foreground code calls [`generate`] and falls back to another source
//! whenever it returns `false`.

use std::sync::OnceLock;

use crate::config::CacheConfig;
use crate::gate::{ArchRandom, InitError};

static INSTANCE: OnceLock<ArchRandom> = OnceLock::new();

/// Probes this machine and installs the resulting service.
///
/// A disabled service (no hardware TRNG) is installed too, so the probe runs once.
pub fn init(config: &CacheConfig) -> Result<&'static ArchRandom, InitError> {
    if let Some(service) = INSTANCE.get() {
        return Ok(service);
    }
    let service = ArchRandom::probe_platform(config)?;
    match install(service) {
        Ok(installed) => Ok(installed),
        Err(rejected) => {
            // Lost the race against a concurrent init
            let _ = rejected.shutdown();
            // Already set by the winner, the initializer never runs
            Ok(INSTANCE.get_or_init(ArchRandom::disabled))
        }
    }
}

/// Installs an already built service.
///
/// Hands `service` back if an instance is already in place.
pub fn install(service: ArchRandom) -> Result<&'static ArchRandom, ArchRandom> {
    let mut pending = Some(service);
    // The initializer runs at most once, while `pending` still holds `service`
    let installed = INSTANCE.get_or_init(|| pending.take().unwrap_or_else(ArchRandom::disabled));
    match pending {
        // Another instance was already in place; ours was never consumed
        Some(rejected) => Err(rejected),
        None => Ok(installed),
    }
}

/// The installed service, if any.
pub fn get() -> Option<&'static ArchRandom> {
    INSTANCE.get()
}

pub fn is_available() -> bool {
    INSTANCE.get().map_or(false, ArchRandom::is_available)
}

/// Fills `buf` from the installed cache. `false` on any miss or before `init`.
pub fn generate(buf: &mut [u8]) -> bool {
    match INSTANCE.get() {
        Some(service) => service.extract(buf),
        None => false,
    }
}

pub fn served_byte_count() -> u64 {
    INSTANCE.get().map_or(0, ArchRandom::served_byte_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init(&CacheConfig::default()).unwrap();
        let second = init(&CacheConfig::default()).unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(get().unwrap(), first));
        assert_eq!(is_available(), first.is_available());

        // A late install is refused
        let rejected = install(ArchRandom::disabled()).unwrap_err();
        assert!(!rejected.is_available());

        let before = served_byte_count();
        let mut buf = [0u8; 16];
        if generate(&mut buf) {
            assert_eq!(served_byte_count(), before + 16);
        } else {
            assert_eq!(served_byte_count(), before);
        }
    }
}
