//! BLAKE3 keyed-XOF DRNG.
//!
//! The seed is condensed into a 256-bit key with BLAKE3's key derivation mode;
//! each `generate` call then reads the keyed extendable output for a fresh
//! block counter, so consecutive calls never repeat output.
//!
//! # Security
//! - **Zeroization**: the derived key is wiped on reseed and on drop.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Drng;
use crate::entropy::EntropyError;

/// Domain separation string for key derivation.
const KDF_CONTEXT: &str = "trng-cache 2024-01-01 buffer refill DRNG v1";

/// DRNG workarea.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct Blake3Drng {
    key: [u8; 32],
    counter: u64,
    seeded: bool,
}

impl Blake3Drng {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drng for Blake3Drng {
    fn name(&self) -> &'static str {
        "Blake3Xof"
    }

    fn seed(&mut self, seed: &[u8]) {
        self.zeroize();
        self.key = ::blake3::derive_key(KDF_CONTEXT, seed);
        self.seeded = true;
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<(), EntropyError> {
        if !self.seeded {
            return Err(EntropyError::InitFailed);
        }
        let mut hasher = ::blake3::Hasher::new_keyed(&self.key);
        hasher.update(&self.counter.to_le_bytes());
        hasher.finalize_xof().fill(out);
        self.counter = self.counter.wrapping_add(1);
        Ok(())
    }
}
