//! Nonblocking random byte cache backed by a hardware TRNG.
//!
//! A small seed of true entropy is fetched from the hardware generator, expanded
//! through a deterministic generator into a fixed-size buffer, and handed out to
//! callers without ever blocking them. A background scheduler watches the fill
//! level and refills the buffer once it is exhausted.
//!
//! # Components
//! - `cache`: the buffer, its remaining-bytes cursor and the served byte counter.
//! - `scheduler`: the self-rearming refill task and its adaptive cadence.
//! - `gate`: capability probing, allocation and the one-shot availability flag.
//! - `entropy` / `drng`: the TRNG and DRNG primitives the refill consumes.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cache;
pub mod config;
pub mod drng;
pub mod entropy;
pub mod platform;
pub mod rng;
pub mod scheduler;

#[cfg(feature = "std")]
pub mod gate;
#[cfg(feature = "std")]
pub mod global;

pub use cache::BufferCache;
pub use config::{CacheConfig, ConfigError};
pub use drng::Drng;
pub use entropy::{EntropyError, EntropySource};
pub use rng::CacheRng;
pub use scheduler::{next_delay, RefillScheduler, RefillStats};

#[cfg(feature = "std")]
pub use gate::{ArchRandom, InitError};
