// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Collection of methods for statistical analysis.
//! Every test takes a block of u64 samples and returns its statistic
//! together with a p value.

use crate::{rngs::RNG, utils};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Generate a vector of lenght 'sample_size'
/// filled with u64 generated using the supplied RNG.
pub fn generate_test_data(test_rng: &mut impl RNG, sample_size: usize) -> Vec<u64> {
    let mut testdata: Vec<u64> = Vec::with_capacity(sample_size);
    for _ in 0..sample_size {
        testdata.push(test_rng.next());
    }
    testdata
}

/// Measures the time taken to generate the specified amount of samples.
/// Returns RNG speed in bytes per second.
pub fn speed_test(test_rng: &mut impl RNG, sample_size: usize) -> f64 {
    let start = std::time::Instant::now();
    for _ in 0..sample_size {
        let sample = test_rng.next();
        std::hint::black_box(sample);
    }
    let timer = start.elapsed();
    ((sample_size as f64) * 8.0) / ((timer.as_nanos() as f64) / 1e9)
}

/// Get p value for given degrees of freedom and chi squared value.
fn chi_squared_p_value(df: u32, chi_squared: f64) -> f64 {
    let chi_squared_dist = ChiSquared::new(df as f64).unwrap();
    chi_squared_dist.cdf(chi_squared)
}

/// Measures the distribution among the bytes.
/// Returns chi2 statistic, p value
pub fn byte_distribution_test(test_data: &[u64]) -> (f64, f64) {
    let mut counts: [usize; 256] = [0; 256];
    for block in test_data.iter() {
        let sample = block.to_le_bytes();
        for by in sample {
            counts[by as usize] += 1;
        }
    }
    let expected: f64 = (test_data.len() as f64 * 8.0) / 256.0;
    let mut chi_squared: f64 = 0.0;
    for value in counts {
        chi_squared += (value as f64 - expected).powi(2) / expected;
    }
    let p = 1.0 - chi_squared_p_value(255, chi_squared);
    (chi_squared, p)
}

/// Measures the difference between the number of ones and zeros generated.
/// NIST Special Publication 800-22 Test 2.1
/// Returns the cummulative difference, p value.
pub fn monobit_test(test_data: &[u64]) -> (i64, f64) {
    let mut difference: i64 = 0;
    for sample in test_data.iter() {
        difference += (sample.count_ones() as i64) - 32;
    }
    let p: f64 = statrs::function::erf::erfc(
        (difference.abs() as f64 / f64::sqrt(test_data.len() as f64 * 64.0)) * utils::INV_ROOT2,
    );
    (difference, p)
}

/// Measures the ratio of ones and zeroes in each u64
/// NIST Special Publication 800-22 Test 2.2
/// Returns chi2 statistic, p value
pub fn u64_block_bit_frequency_test(test_data: &[u64]) -> (f64, f64) {
    let mut chi_squared: f64 = 0.0;
    let expected: f64 = 0.5;
    for sample in test_data.iter() {
        chi_squared += ((sample.count_ones() as f64) / 64.0 - expected).powi(2);
    }
    chi_squared *= 4.0 * 64.0;
    let p: f64 = statrs::function::gamma::checked_gamma_lr(
        (test_data.len() as f64) / 2.0,
        chi_squared / 2.0,
    )
    .unwrap();
    (chi_squared, p)
}

/// Meansures the number of unintterupted sequences of ones/zeroes.
/// NIST Special Publication 800-22 Test 2.3
/// The observed ones ratio comes from the data itself.
/// Returns number of runs, p value
pub fn runs_test(test_data: &[u64]) -> (u64, f64) {
    let mut runs: u64 = 0;
    // This sometimes introduces a off by one error
    // If the first bit is a 1.
    // Considerd acceptable error to save additional complexitiy and execution time.
    let mut last_bit = (test_data[0] >> 63) & 1; // Extract the MSB of the first word
    let mut excess_ones: i64 = 0;

    for &sample in test_data.iter() {
        excess_ones += (sample.count_ones() as i64) - 32;
        let transitions = sample ^ (sample >> 1); // Transitions within the word
        runs += transitions.count_ones() as u64; // Count them
                                                 // Check transition between words
        let first_bit = sample & 1;
        if first_bit != last_bit {
            runs += 1; // Count transition across words
        }

        last_bit = (sample >> 63) & 1; // Store last bit for next iteration
        if last_bit != 0 {
            runs -= 1;
        }
    }
    let num_bits: f64 = test_data.len() as f64 * 64.0;
    let ones_ratio: f64 = ((num_bits / 2.0) + excess_ones as f64) / num_bits;
    let p: f64 = statrs::function::erf::erfc(
        ((runs as f64) - (2.0 * ones_ratio * num_bits * (1.0 - ones_ratio))).abs()
            / (2.0 * f64::sqrt(2.0 * num_bits) * ones_ratio * (1.0 - ones_ratio)),
    );
    (runs, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::philox::Philox4x32;
    use crate::rngs::{testgens, RNG};

    fn philox_data(samples: usize) -> Vec<u64> {
        let mut rng: Philox4x32 = RNG::new(0xc0ffee);
        generate_test_data(&mut rng, samples)
    }

    #[test]
    fn monobit_flags_constant_output() {
        let mut zeroes = testgens::OnlyZero::new(0);
        let data = generate_test_data(&mut zeroes, 256);
        let (difference, p) = monobit_test(&data);
        assert_eq!(difference, -32 * 256);
        assert!(p < 1e-6);

        let mut ones = testgens::OnlyOne::new(0);
        let data = generate_test_data(&mut ones, 256);
        let (difference, p) = monobit_test(&data);
        assert_eq!(difference, 32 * 256);
        assert!(p < 1e-6);
    }

    #[test]
    fn byte_distribution_flags_constant_output() {
        let mut ones = testgens::OnlyOne::new(0);
        let data = generate_test_data(&mut ones, 1024);
        let (_, p) = byte_distribution_test(&data);
        assert!(p < 1e-6);
    }

    #[test]
    fn tests_return_probabilities_on_engine_output() {
        let data = philox_data(4096);
        let (_, p) = byte_distribution_test(&data);
        assert!((0.0..=1.0).contains(&p));
        let (_, p) = monobit_test(&data);
        assert!((0.0..=1.0).contains(&p));
        let (_, p) = u64_block_bit_frequency_test(&data);
        assert!((0.0..=1.0).contains(&p));
        let (_, p) = runs_test(&data);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_data_is_reproducible() {
        assert_eq!(philox_data(64), philox_data(64));
    }

    #[test]
    fn speed_test_reports_throughput() {
        let mut rng: Philox4x32 = RNG::new(1);
        assert!(speed_test(&mut rng, 1024) > 0.0);
    }
}
