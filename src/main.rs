// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Run the statistical suite over the Philox engine family.

use philoxide::rng_testing::test_suite;
use philoxide::rngs::{ReferenceRand, RNG};
use philoxide::{Philox2x32, Philox2x64, Philox4x32, Philox4x64};

fn main() {
    let start = std::time::Instant::now();
    const TEST_SIZE_EXPONENT: usize = 20;
    const TEST_SIZE: usize = 1 << TEST_SIZE_EXPONENT;
    let mut r = ReferenceRand::new(0);
    test_suite(&mut r, TEST_SIZE, "Reference");
    let mut r = Philox4x32::new(0);
    test_suite(&mut r, TEST_SIZE, "Philox4x32");
    let mut r = Philox4x64::new(0);
    test_suite(&mut r, TEST_SIZE, "Philox4x64");
    let mut r = Philox2x32::new(0);
    test_suite(&mut r, TEST_SIZE, "Philox2x32");
    let mut r = Philox2x64::new(0);
    test_suite(&mut r, TEST_SIZE, "Philox2x64");
    println!("Total runtime: {:?}", start.elapsed());
}
