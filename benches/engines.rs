// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use philoxide::{Philox4x32, Philox4x64};

pub fn benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");

    group.bench_function("philox4x32 word", |b| {
        let mut rng = Philox4x32::new(1);
        b.iter(|| rng.next_word())
    });

    group.bench_function("philox4x64 word", |b| {
        let mut rng = Philox4x64::new(1);
        b.iter(|| rng.next_word())
    });

    group.finish();

    let mut group = c.benchmark_group("seek");

    group.bench_function("philox4x64 discard 1e9", |b| {
        b.iter_batched_ref(
            || Philox4x64::new(1),
            |rng| rng.discard(1_000_000_000),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
