// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Engine front-ends.
//! All generators implement the RNG interface; the Philox engines also
//! implement rand's `RngCore`/`SeedableRng` so they drop into ecosystem
//! code.

use rand::{RngCore, SeedableRng};

use crate::philox::{Philox2x32, Philox2x64, Philox4x32, Philox4x64};

/// General trait for PRNGs
pub trait RNG {
    /// Initialize with specified seed.
    fn new(seed: u64) -> Self;
    /// Generate u32 and advance the state one step.
    fn next_u32(&mut self) -> u32;
    /// Generate u64 and advance the state one step.
    /// For generators that dont support full u64 might advance
    /// state more than one step.
    fn next(&mut self) -> u64;
    /// Advance the generator state by the specified amount of steps.
    /// Counter-based generators seek in constant time; others take a
    /// similar amount of time to generating (delta) outputs.
    fn advance(&mut self, delta: usize);
    /// Reset to inital state, equivalent to repalcing with ::new(seed).
    fn reseed(&mut self, seed: u64);
}

/// The rand crates default RNG, used to calibrate the test suite.
pub struct ReferenceRand {
    rng: rand::rngs::StdRng,
}

impl RNG for ReferenceRand {
    fn new(seed: u64) -> Self {
        ReferenceRand {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn advance(&mut self, delta: usize) {
        for _ in 0..delta {
            let _ = self.next();
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = rand::rngs::StdRng::seed_from_u64(seed);
    }
}

macro_rules! philox_front_end {
    ($engine:ty, u32, $seed_bytes:literal, $key_len:literal) => {
        impl RNG for $engine {
            fn new(seed: u64) -> Self {
                <$engine>::new(seed as u32)
            }

            fn next_u32(&mut self) -> u32 {
                self.next_word()
            }

            fn next(&mut self) -> u64 {
                let a: u64 = self.next_word() as u64;
                let b: u64 = self.next_word() as u64;
                (a << 32) | b
            }

            fn advance(&mut self, delta: usize) {
                self.discard(delta as u64);
            }

            fn reseed(&mut self, seed: u64) {
                self.seed(seed as u32);
            }
        }

        impl RngCore for $engine {
            fn next_u32(&mut self) -> u32 {
                self.next_word()
            }

            fn next_u64(&mut self) -> u64 {
                let a = self.next_word() as u64;
                let b = self.next_word() as u64;
                (a << 32) | b
            }

            fn fill_bytes(&mut self, dest: &mut [u8]) {
                let mut chunks = dest.chunks_exact_mut(4);
                for chunk in &mut chunks {
                    chunk.copy_from_slice(&self.next_word().to_le_bytes());
                }
                let rem = chunks.into_remainder();
                if !rem.is_empty() {
                    let spare = self.next_word().to_le_bytes();
                    rem.copy_from_slice(&spare[..rem.len()]);
                }
            }

            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }

        impl SeedableRng for $engine {
            type Seed = [u8; $seed_bytes];

            /// Key bytes, little-endian per key word.
            fn from_seed(seed: Self::Seed) -> Self {
                let mut key = [0u32; $key_len];
                for (slot, chunk) in seed.chunks_exact(4).enumerate() {
                    key[slot] = u32::from_le_bytes(chunk.try_into().unwrap());
                }
                Self::from_key(key)
            }

            fn seed_from_u64(state: u64) -> Self {
                <$engine>::new(state as u32)
            }
        }
    };
    ($engine:ty, u64, $seed_bytes:literal, $key_len:literal) => {
        impl RNG for $engine {
            fn new(seed: u64) -> Self {
                <$engine>::new(seed)
            }

            fn next_u32(&mut self) -> u32 {
                self.next_word() as u32
            }

            fn next(&mut self) -> u64 {
                self.next_word()
            }

            fn advance(&mut self, delta: usize) {
                self.discard(delta as u64);
            }

            fn reseed(&mut self, seed: u64) {
                self.seed(seed);
            }
        }

        impl RngCore for $engine {
            fn next_u32(&mut self) -> u32 {
                self.next_word() as u32
            }

            fn next_u64(&mut self) -> u64 {
                self.next_word()
            }

            fn fill_bytes(&mut self, dest: &mut [u8]) {
                let mut chunks = dest.chunks_exact_mut(8);
                for chunk in &mut chunks {
                    chunk.copy_from_slice(&self.next_word().to_le_bytes());
                }
                let rem = chunks.into_remainder();
                if !rem.is_empty() {
                    let spare = self.next_word().to_le_bytes();
                    rem.copy_from_slice(&spare[..rem.len()]);
                }
            }

            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }

        impl SeedableRng for $engine {
            type Seed = [u8; $seed_bytes];

            /// Key bytes, little-endian per key word.
            fn from_seed(seed: Self::Seed) -> Self {
                let mut key = [0u64; $key_len];
                for (slot, chunk) in seed.chunks_exact(8).enumerate() {
                    key[slot] = u64::from_le_bytes(chunk.try_into().unwrap());
                }
                Self::from_key(key)
            }

            fn seed_from_u64(state: u64) -> Self {
                <$engine>::new(state)
            }
        }
    };
}

philox_front_end!(Philox4x32, u32, 8, 2);
philox_front_end!(Philox2x32, u32, 4, 1);
philox_front_end!(Philox4x64, u64, 16, 2);
philox_front_end!(Philox2x64, u64, 8, 1);

/// Degenerate generators used to check that the statistical tests
/// actually flag broken output.
pub mod testgens {
    use super::RNG;

    pub struct OnlyOne {}
    impl RNG for OnlyOne {
        fn new(_seed: u64) -> Self {
            OnlyOne {}
        }

        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next(&mut self) -> u64 {
            u64::MAX
        }

        fn advance(&mut self, _delta: usize) {}

        fn reseed(&mut self, _seed: u64) {}
    }

    pub struct OnlyZero {}
    impl RNG for OnlyZero {
        fn new(_seed: u64) -> Self {
            OnlyZero {}
        }

        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next(&mut self) -> u64 {
            0
        }

        fn advance(&mut self, _delta: usize) {}

        fn reseed(&mut self, _seed: u64) {}
    }
}
