//! Criterion micro-benchmarks for plan generation and the plan codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trapeze_core::{Domain, Slopes};
use trapeze_plan::{GeneratorConfig, PlanGenerator, PlanStore};

fn heat_slopes() -> Slopes {
    Slopes::from_vec(vec![2, 3])
}

/// Benchmark: generate a 1024x1024 periodic plan for 256 steps.
fn bench_generate_periodic_2d(c: &mut Criterion) {
    let domain = Domain::from_sizes(&[1024, 1024]).unwrap();
    let generator = PlanGenerator::default();
    c.bench_function("generate_periodic_2d", |b| {
        b.iter(|| {
            let plan = generator
                .generate(black_box(&domain), &heat_slopes(), true, 256)
                .unwrap();
            black_box(plan.leaf_count());
        });
    });
}

/// Benchmark: generate with tiny leaves, so the tree is deep.
fn bench_generate_fine_leaves(c: &mut Criterion) {
    let domain = Domain::from_sizes(&[256, 256]).unwrap();
    let generator = PlanGenerator::new(GeneratorConfig {
        leaf_volume: 64,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("generate_fine_leaves", |b| {
        b.iter(|| {
            let plan = generator
                .generate(black_box(&domain), &heat_slopes(), false, 128)
                .unwrap();
            black_box(plan.node_count());
        });
    });
}

/// Benchmark: encode and decode a deep plan.
fn bench_codec_round_trip(c: &mut Criterion) {
    let domain = Domain::from_sizes(&[256, 256]).unwrap();
    let plan = PlanGenerator::new(GeneratorConfig {
        leaf_volume: 64,
        ..Default::default()
    })
    .unwrap()
    .generate(&domain, &heat_slopes(), true, 128)
    .unwrap();
    let bytes = PlanStore::to_bytes(&plan).unwrap();

    c.bench_function("codec_encode_plan", |b| {
        b.iter(|| {
            let out = PlanStore::to_bytes(black_box(&plan)).unwrap();
            black_box(out.len());
        });
    });
    c.bench_function("codec_decode_plan", |b| {
        b.iter(|| {
            let decoded = PlanStore::from_bytes(black_box(&bytes)).unwrap();
            black_box(decoded.node_count());
        });
    });
}

criterion_group!(
    benches,
    bench_generate_periodic_2d,
    bench_generate_fine_leaves,
    bench_codec_round_trip
);
criterion_main!(benches);
