// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Static data used by the test suite.

pub mod rng_test {
    /// Fixed seeds so suite runs are reproducible.
    /// Mix of degenerate values, golden ratio bit patterns and
    /// arbitrary phrases.
    pub const STATIC_TEST_SEEDS: [u64; 8] = [
        0x0000000000000000,
        0xffffffffffffffff,
        0x0000000000000001,
        0x9e3779b97f4a7c15,
        0x5555555555555555,
        0xaaaaaaaaaaaaaaaa,
        0x0123456789abcdef,
        0xdeadbeefcafebabe,
    ];
}
