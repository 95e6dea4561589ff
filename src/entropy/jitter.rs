//! CPU Jitter Entropy Source.
//!
//! Harvests entropy from execution timing variations of a short busy loop
//! (cache misses, pipeline stalls, interrupts). Far slower than the hardware
//! generator and of lower quality, but independent of it, which makes it the
//! fallback a caller reaches for when the cache reports a miss.

use super::{EntropyError, EntropySource};

/// Timing samples folded into each output bit.
const SAMPLES_PER_BIT: usize = 8;

/// CPU Jitter Entropy Source.
#[derive(Debug, Default)]
pub struct JitterSource {
    _private: (),
}

impl JitterSource {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Reads a high-resolution CPU timestamp counter.
    #[inline(always)]
    fn timestamp() -> u64 {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            #[cfg(target_arch = "x86")]
            use core::arch::x86::_rdtsc;
            #[cfg(target_arch = "x86_64")]
            use core::arch::x86_64::_rdtsc;

            // Safety: TSC is present on every x86 CPU since Pentium.
            unsafe { _rdtsc() }
        }

        #[cfg(target_arch = "aarch64")]
        {
            let cnt: u64;
            // Safety: CNTVCT_EL0 is readable from EL0 on all supported kernels.
            unsafe {
                core::arch::asm!("mrs {}, cntvct_el0", out(reg) cnt);
            }
            cnt
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            0
        }
    }

    #[inline(always)]
    fn spin() {
        let mut x = 0u64;
        for i in 0..10 {
            x = x.wrapping_add(i);
            core::hint::black_box(x);
        }
    }

    /// Samples one bit as the parity of several folded timing deltas.
    fn sample_bit() -> u8 {
        let mut folded = 0u64;
        for _ in 0..SAMPLES_PER_BIT {
            let start = Self::timestamp();
            Self::spin();
            folded ^= Self::timestamp().wrapping_sub(start);
        }
        (folded.count_ones() & 1) as u8
    }
}

impl EntropySource for JitterSource {
    fn name(&self) -> &'static str {
        "CpuJitter"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let t1 = Self::timestamp();
        Self::spin();
        let t2 = Self::timestamp();
        if t1 == 0 && t2 == 0 {
            return Err(EntropyError::NotSupported);
        }

        for byte in dest.iter_mut() {
            *byte = (0..8).fold(0u8, |acc, _| (acc << 1) | Self::sample_bit());
        }
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_fill() {
        let mut source = JitterSource::new();
        let mut buf = [0u8; 32];
        match source.fill(&mut buf) {
            Ok(()) => assert!(buf.iter().any(|&x| x != 0), "jitter produced all zeros"),
            Err(EntropyError::NotSupported) => {
                #[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
                panic!("jitter should be supported on this architecture");
            }
            Err(e) => panic!("jitter failed: {:?}", e),
        }
    }
}
