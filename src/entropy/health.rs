//! Continuous health tests for fetched seeds (NIST SP 800-90B, section 4.4).
//!
//! The tester keeps its state across refill cycles, so a source that gets stuck
//! is caught even when each individual seed is short.
//!
//! # Tests
//! - Repetition Count Test: detects a source stuck on one value.
//! - Adaptive Proportion Test: detects a value becoming too common within a window.

use super::EntropyError;

/// Identical consecutive samples that trip the repetition count test.
///
/// For H=4.0 bits/byte and alpha=2^-20 the bound is 1 + ceil(20 / 4) = 6;
/// 10 leaves a safety margin.
const RCT_CUTOFF: usize = 10;

/// Adaptive proportion test window, in samples.
const APT_WINDOW: usize = 512;

/// Occurrences of the window's first sample that trip the adaptive proportion test.
///
/// W * (2^-H + 2.576 * sqrt((1 - 2^-H) / (W * 2^H))) is about 39 for W=512, H=4.0.
const APT_CUTOFF: usize = 50;

/// Health tester for a stream of entropy bytes.
#[derive(Debug, Default)]
pub struct HealthTester {
    last_sample: u8,
    repetition_count: usize,

    window_count: usize,
    window_value: u8,
    window_hits: usize,
}

impl HealthTester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every byte of `seed` through both tests.
    ///
    /// Stops at the first failing byte.
    pub fn check(&mut self, seed: &[u8]) -> Result<(), EntropyError> {
        seed.iter().try_for_each(|&sample| self.feed(sample))
    }

    /// Feeds a byte sample into the health tests.
    pub fn feed(&mut self, sample: u8) -> Result<(), EntropyError> {
        self.repetition_count(sample)?;
        self.adaptive_proportion(sample)
    }

    fn repetition_count(&mut self, sample: u8) -> Result<(), EntropyError> {
        if self.repetition_count > 0 && sample == self.last_sample {
            self.repetition_count += 1;
            if self.repetition_count >= RCT_CUTOFF {
                return Err(EntropyError::HealthTestFailed);
            }
        } else {
            self.last_sample = sample;
            self.repetition_count = 1;
        }
        Ok(())
    }

    fn adaptive_proportion(&mut self, sample: u8) -> Result<(), EntropyError> {
        if self.window_count == 0 {
            self.window_value = sample;
            self.window_hits = 1;
            self.window_count = 1;
            return Ok(());
        }

        if sample == self.window_value {
            self.window_hits += 1;
        }
        self.window_count += 1;

        if self.window_count >= APT_WINDOW {
            self.window_count = 0;
            if self.window_hits >= APT_CUTOFF {
                return Err(EntropyError::HealthTestFailed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repetition_failure() {
        let mut tester = HealthTester::new();
        for _ in 0..9 {
            assert!(tester.feed(0).is_ok());
        }
        assert_eq!(tester.feed(0), Err(EntropyError::HealthTestFailed));
    }

    #[test]
    fn test_repetition_spans_seeds() {
        let mut tester = HealthTester::new();
        assert!(tester.check(&[1, 2, 7, 7, 7, 7, 7]).is_ok());
        // Five more sevens make ten in a row across the boundary
        assert_eq!(tester.check(&[7; 5]), Err(EntropyError::HealthTestFailed));
    }

    #[test]
    fn test_adaptive_proportion_failure() {
        let mut tester = HealthTester::new();
        // Every other sample equals the window's first value: no run of repeats,
        // but 256 hits in a 512 window.
        let seed: [u8; 32] = core::array::from_fn(|i| if i % 2 == 0 { 0xAA } else { i as u8 });
        let mut result = Ok(());
        for _ in 0..(APT_WINDOW / seed.len()) {
            result = tester.check(&seed);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(EntropyError::HealthTestFailed));
    }

    #[test]
    fn test_varied_stream_passes() {
        let mut tester = HealthTester::new();
        for round in 0..64u8 {
            let seed: [u8; 32] =
                core::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(round));
            assert!(tester.check(&seed).is_ok());
        }
    }
}
