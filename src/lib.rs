// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Counter-based Philox PRNGs and methods for statistical analysis.
//!
//! The heart of the crate is [`PhiloxEngine`], a family of deterministic,
//! bit-reproducible generators in which the state is an explicit block
//! counter. Jumping to any point of the output stream is a counter
//! assignment, so `discard` runs in constant time and parallel workloads
//! can split one logical stream by key or by counter region.
//!
//! The named family members ([`Philox4x32`], [`Philox4x64`], [`Philox2x32`],
//! [`Philox2x64`]) all implement the crate-local [`RNG`](rngs::RNG)
//! interface as well as `rand`'s `RngCore`/`SeedableRng`, so they plug into
//! the statistical test suite in [`rng_testing`].

pub mod philox;
pub mod rng_testing;
pub mod rngs;
pub mod stats;
pub mod testdata;
pub mod utils;
pub mod words;

pub use philox::{
    Philox2x32, Philox2x64, Philox4x32, Philox4x64, PhiloxEngine, PhiloxParams, SeedSequence,
    DEFAULT_SEED,
};
pub use rngs::RNG;
pub use words::PhiloxWord;
