//! Intel Secure Key (RDRAND) Entropy Source.
//!
//! Uses the on-chip hardware random number generator present in modern x86/x86_64 CPUs.
//! Construction goes through [`RdRandSource::new`], which checks CPUID first, so
//! the instruction is never issued on a CPU that lacks it.

use super::{EntropyError, EntropySource};

#[cfg(target_arch = "x86")]
use core::arch::x86::{__cpuid, __get_cpuid_max, _rdrand32_step};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{__cpuid, __get_cpuid_max, _rdrand64_step};

/// CPUID.01H:ECX.RDRAND[bit 30]
const RDRAND_BIT: u32 = 1 << 30;

/// Consecutive failed steps tolerated before the fetch is abandoned.
const MAX_RETRIES: usize = 10;

/// Returns `true` if the CPU implements RDRAND.
#[allow(unused_unsafe)]
pub fn is_supported() -> bool {
    // Safety: CPUID is available on every CPU this target runs on.
    let (max_leaf, _) = unsafe { __get_cpuid_max(0) };
    if max_leaf < 1 {
        return false;
    }
    let leaf = unsafe { __cpuid(1) };
    leaf.ecx & RDRAND_BIT != 0
}

/// Hardware RDRAND Entropy Source.
pub struct RdRandSource {
    _private: (),
}

impl RdRandSource {
    /// Returns a source if the CPU supports RDRAND, `None` otherwise.
    pub fn new() -> Option<Self> {
        if is_supported() {
            Some(Self { _private: () })
        } else {
            None
        }
    }

    /// Creates a source without checking CPUID.
    ///
    /// # Safety
    /// Caller must ensure the CPU supports RDRAND (CPUID.01H:ECX.RDRAND[bit 30] = 1).
    pub unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }

    #[cfg(target_arch = "x86_64")]
    fn step() -> Option<u64> {
        let mut val: u64 = 0;
        // Safety: RDRAND presence was established when `self` was built.
        let success = unsafe { _rdrand64_step(&mut val) };
        (success == 1).then_some(val)
    }

    #[cfg(target_arch = "x86")]
    fn step() -> Option<u64> {
        let mut lo: u32 = 0;
        let mut hi: u32 = 0;
        // Safety: RDRAND presence was established when `self` was built.
        let ok = unsafe { _rdrand32_step(&mut lo) == 1 && _rdrand32_step(&mut hi) == 1 };
        ok.then_some(((hi as u64) << 32) | lo as u64)
    }
}

impl EntropySource for RdRandSource {
    fn name(&self) -> &'static str {
        "RdRand"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut retry_count = 0;

        for chunk in dest.chunks_mut(8) {
            let val = loop {
                match Self::step() {
                    Some(val) => break val,
                    None => {
                        retry_count += 1;
                        if retry_count > MAX_RETRIES {
                            return Err(EntropyError::CollectionFailed);
                        }
                    }
                }
            };
            retry_count = 0;
            chunk.copy_from_slice(&val.to_le_bytes()[..chunk.len()]);
        }
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        // RDRAND is compliant with SP 800-90B/C and provides full entropy.
        8.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdrand_fill_when_present() {
        let Some(mut source) = RdRandSource::new() else {
            return;
        };
        let mut buf = [0u8; 37];
        assert!(source.fill(&mut buf).is_ok());
        assert!(buf.iter().any(|&x| x != 0));
    }
}
