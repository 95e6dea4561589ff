//! Hardware capability probing.
//!
//! The cache is only worth enabling when both primitives a refill needs are
//! present: a true-random fetch to seed from and a deterministic generator to
//! expand with.

use core::fmt;

/// Primitive subfunctions a refill cycle relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subfunction {
    /// True-random seed fetch.
    TrngFetch,
    /// Deterministic expansion of a seeded workarea.
    DrngGenerate,
}

impl Subfunction {
    /// Every subfunction the cache needs.
    pub const REQUIRED: [Subfunction; 2] = [Subfunction::TrngFetch, Subfunction::DrngGenerate];
}

impl fmt::Display for Subfunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subfunction::TrngFetch => write!(f, "TRNG fetch"),
            Subfunction::DrngGenerate => write!(f, "DRNG generate"),
        }
    }
}

/// Answers whether a primitive subfunction is available.
pub trait HardwareProbe {
    fn query(&self, function: Subfunction) -> bool;

    /// Returns the first required subfunction that is missing, if any.
    fn missing(&self) -> Option<Subfunction> {
        Subfunction::REQUIRED.into_iter().find(|&f| !self.query(f))
    }
}

/// Probe for the machine the process runs on.
///
/// The TRNG is the CPU's RDRAND; the DRNG is BLAKE3 in software and is always present.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformProbe;

impl HardwareProbe for PlatformProbe {
    fn query(&self, function: Subfunction) -> bool {
        match function {
            Subfunction::TrngFetch => {
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                {
                    crate::entropy::rdrand::is_supported()
                }
                #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
                {
                    false
                }
            }
            Subfunction::DrngGenerate => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Only(Option<Subfunction>);

    impl HardwareProbe for Only {
        fn query(&self, function: Subfunction) -> bool {
            self.0 == Some(function)
        }
    }

    #[test]
    fn test_missing_reports_first_absent() {
        assert_eq!(Only(None).missing(), Some(Subfunction::TrngFetch));
        assert_eq!(Only(Some(Subfunction::TrngFetch)).missing(), Some(Subfunction::DrngGenerate));
        assert_eq!(Only(Some(Subfunction::DrngGenerate)).missing(), Some(Subfunction::TrngFetch));
    }

    #[test]
    fn test_platform_always_has_drng() {
        assert!(PlatformProbe.query(Subfunction::DrngGenerate));
    }
}
