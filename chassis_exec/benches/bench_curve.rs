//! # Curve Evaluation Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use util::curve::{Curve, StepTable};

fn curve_benchmark(c: &mut Criterion) {
    // A speed-to-angle schedule of typical size
    let curve = Curve::ascending(
        &[25.0, 70.0, 80.0, 95.0, 100.0],
        &[44.0, 42.0, 40.0, 35.0, 33.0],
    )
    .unwrap();

    c.bench_function("curve_eval_mid", |b| {
        b.iter(|| curve.eval(black_box(82.5)))
    });

    c.bench_function("curve_eval_past_end", |b| {
        b.iter(|| curve.eval(black_box(150.0)))
    });

    let step = StepTable::new(
        &[0.0, 70.0, 88.0, 94.0],
        &[true, false, true, false],
    )
    .unwrap();

    c.bench_function("step_lookup", |b| {
        b.iter(|| step.lookup(black_box(90.0)))
    });
}

criterion_group!(benches, curve_benchmark);
criterion_main!(benches);
