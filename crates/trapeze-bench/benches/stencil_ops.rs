//! Criterion benchmarks comparing plan execution with the reference sweep.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trapeze_bench::{diamond_profile, reference_profile, PROFILE_TIMESTEPS};
use trapeze_engine::{sweep, ExecutorConfig};

/// Benchmark: parallel plan run, 256x256 heat.
fn bench_plan_run_parallel(c: &mut Criterion) {
    let (stencil, array) = reference_profile(42);
    let plan = stencil
        .gen_plan(array.domain(), array.boundary(), PROFILE_TIMESTEPS)
        .unwrap();
    c.bench_function("plan_run_parallel_256", |b| {
        b.iter(|| {
            let mut a = array.clone();
            let m = stencil.run_plan(&plan, &mut a).unwrap();
            black_box(m.cells);
        });
    });
}

/// Benchmark: sequential plan run, 256x256 heat.
fn bench_plan_run_sequential(c: &mut Criterion) {
    let (stencil, array) = reference_profile(42);
    let stencil = stencil.with_executor(ExecutorConfig::sequential()).unwrap();
    let plan = stencil
        .gen_plan(array.domain(), array.boundary(), PROFILE_TIMESTEPS)
        .unwrap();
    c.bench_function("plan_run_sequential_256", |b| {
        b.iter(|| {
            let mut a = array.clone();
            let m = stencil.run_plan(&plan, &mut a).unwrap();
            black_box(m.cells);
        });
    });
}

/// Benchmark: time-major reference sweep, 256x256 heat.
fn bench_reference_sweep(c: &mut Criterion) {
    let (stencil, array) = reference_profile(42);
    c.bench_function("reference_sweep_256", |b| {
        b.iter(|| {
            let mut a = array.clone();
            sweep(stencil.kernels(), &mut a, PROFILE_TIMESTEPS).unwrap();
            black_box(a.ring_depth());
        });
    });
}

/// Benchmark: guarded 1-D stencil, plan run.
fn bench_diamond_plan_run(c: &mut Criterion) {
    let (stencil, array) = diamond_profile(42);
    let plan = stencil
        .gen_plan(array.domain(), array.boundary(), PROFILE_TIMESTEPS)
        .unwrap();
    let mut group = c.benchmark_group("diamond");
    group.sample_size(10);
    group.bench_function("plan_run_1m", |b| {
        b.iter(|| {
            let mut a = array.clone();
            let m = stencil.run_plan(&plan, &mut a).unwrap();
            black_box(m.leaves);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_run_parallel,
    bench_plan_run_sequential,
    bench_reference_sweep,
    bench_diamond_plan_run
);
criterion_main!(benches);
