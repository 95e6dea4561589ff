//! Deterministic random bit generators.
//!
//! A DRNG turns the short seed fetched from the TRNG into a full buffer of
//! pseudo-random output. The contract mirrors a hardware DRNG instruction pair:
//! `seed` fully re-initialises the workarea, `generate` expands it.

pub mod blake3;

pub use self::blake3::Blake3Drng;

use crate::entropy::EntropyError;

/// Seed/generate contract for a deterministic generator.
pub trait Drng {
    /// Returns a unique identifier for the generator.
    fn name(&self) -> &'static str;

    /// Re-initialises the workarea from `seed`, discarding any previous state.
    fn seed(&mut self, seed: &[u8]);

    /// Expands the current workarea into `out`.
    ///
    /// Same seed, same sequence of calls, same output.
    ///
    /// # Errors
    /// * `EntropyError::InitFailed` if called before the first `seed`.
    fn generate(&mut self, out: &mut [u8]) -> Result<(), EntropyError>;
}

impl<D: Drng + ?Sized> Drng for alloc::boxed::Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn seed(&mut self, seed: &[u8]) {
        (**self).seed(seed)
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<(), EntropyError> {
        (**self).generate(out)
    }
}
