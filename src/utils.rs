// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions.

use std::time::Duration;

pub const INV_ROOT2: f64 = 0.7071067811865475;

/// Format a number of bytes into a pretty String.
/// e.g. 1048576 is 1 MiB
pub fn format_byte_count(num_bytes: usize) -> String {
    // 2**30 = 1073741824
    if num_bytes > 1073741824 {
        format!("{:.2} GiB", (num_bytes as f64 / 1073741824.0))
    // 2**20 = 1048576
    } else if num_bytes > 1048576 {
        format!("{:.2} MiB", (num_bytes as f64 / 1048576.0))
    // 2**10 = 1024
    } else if num_bytes > 1024 {
        format!("{:.2} KiB", (num_bytes as f64 / 1024.0))
    } else {
        format!("{:.2} B", num_bytes as f64)
    }
}

/// Format a duration for the aligned suite reports.
/// Sub-millisecond times keep microsecond resolution.
pub fn format_elapsed_time(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    if micros >= 1_000_000 {
        format!("{:>8.3} s", elapsed.as_secs_f64())
    } else if micros >= 1_000 {
        format!("{:>8.3} ms", micros as f64 / 1000.0)
    } else {
        format!("{:>8} us", micros)
    }
}
