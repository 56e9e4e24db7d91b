//! End-to-end runs of the reference scenarios: generate, store, load and
//! execute a plan, then compare against the sequential sweep.

use trapeze_array::{Array, ArrayConfig, BoundaryPolicy};
use trapeze_core::{Domain, StencilError};
use trapeze_engine::{compare, sweep, ExecutorConfig, Stencil};
use trapeze_plan::GeneratorConfig;
use trapeze_test_utils::{
    diamond_kernels, heat_2d_kernels, heat_5pt_kernels, heat_7pt_kernels, lagged_1d_kernels,
    seeded_fill, star_kernels,
};

fn small_leaves(leaf_volume: u64) -> GeneratorConfig {
    GeneratorConfig {
        leaf_volume,
        ..Default::default()
    }
}

/// Run through a stored and reloaded plan, and compare with the sweep.
fn plan_vs_sweep(stencil: &Stencil<f64>, mut array: Array<f64>, timesteps: u64) -> f64 {
    let mut reference = array.clone();
    sweep(stencil.kernels(), &mut reference, timesteps).unwrap();

    let plan = stencil
        .gen_plan(array.domain(), array.boundary(), timesteps)
        .unwrap();
    let mut bytes = Vec::new();
    stencil.store_plan(&plan, &mut bytes).unwrap();
    let loaded = stencil.load_plan(bytes.as_slice()).unwrap();
    assert_eq!(loaded, plan);

    let metrics = stencil
        .run_plan_steps(&loaded, &mut array, timesteps)
        .unwrap();
    assert_eq!(metrics.timesteps, timesteps);
    assert_eq!(metrics.cells, array.domain().cell_count() * timesteps);

    let cmp = compare(&array, &reference, timesteps as i64, 1e-6).unwrap();
    assert!(cmp.is_match(), "{cmp:?}");
    cmp.max_abs_diff
}

#[test]
fn scenario_a_diamond_1d() {
    let stencil = Stencil::new(diamond_kernels(64, 32))
        .with_generator(small_leaves(16))
        .unwrap();
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 1, 1.0);
    plan_vs_sweep(&stencil, a, 32);
}

#[test]
fn scenario_a_sequential_and_dedicated_pool() {
    for exec in [
        ExecutorConfig::sequential(),
        ExecutorConfig {
            parallel: true,
            threads: Some(3),
        },
    ] {
        let stencil = Stencil::new(diamond_kernels(64, 32))
            .with_generator(small_leaves(8))
            .unwrap()
            .with_executor(exec)
            .unwrap();
        let mut a = stencil
            .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
            .unwrap();
        seeded_fill(&mut a, 0, 2, 1.0);
        plan_vs_sweep(&stencil, a, 32);
    }
}

#[test]
fn scenario_b_heat_2d_exact() {
    let stencil = Stencil::new(heat_2d_kernels())
        .with_generator(small_leaves(64))
        .unwrap();
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![16, 33]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 3, 1e-6);
    let max = plan_vs_sweep(&stencil, a, 67);
    assert_eq!(max, 0.0);
}

#[test]
fn scenario_b_seven_point_heat_exact() {
    let stencil = Stencil::new(heat_7pt_kernels())
        .with_generator(small_leaves(64))
        .unwrap();
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![16, 33]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 3, 1e-6);
    let max = plan_vs_sweep(&stencil, a, 67);
    assert_eq!(max, 0.0);
}

#[test]
fn three_step_lookback_matches_sweep() {
    let stencil = Stencil::new(lagged_1d_kernels());
    for boundary in [BoundaryPolicy::Periodic, BoundaryPolicy::ZeroFill] {
        for leaf_volume in [1, 3, 8, 20] {
            let stencil = stencil.clone().with_generator(small_leaves(leaf_volume)).unwrap();
            let mut a = stencil
                .array_with(ArrayConfig::new(vec![57]).boundary(boundary.clone()))
                .unwrap();
            assert_eq!(a.ring_depth(), 6);
            for t in [0, -1, -2] {
                seeded_fill(&mut a, t, 10 + t.unsigned_abs(), 1.0 / 1024.0);
            }
            let max = plan_vs_sweep(&stencil, a, 40);
            assert_eq!(max, 0.0, "{} with leaf volume {leaf_volume}", boundary.name());
        }
    }
}

#[test]
fn scenario_c_timestep_mismatch_leaves_array_untouched() {
    let stencil = Stencil::new(diamond_kernels(64, 50));
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 4, 1.0);
    let before: Vec<Vec<f64>> = (0..a.ring_depth() as i64).map(|t| a.slice(t)).collect();

    let plan = stencil.gen_plan(a.domain(), a.boundary(), 50).unwrap();
    let mut bytes = Vec::new();
    stencil.store_plan(&plan, &mut bytes).unwrap();
    let plan = stencil.load_plan(bytes.as_slice()).unwrap();

    let err = stencil.run_plan_steps(&plan, &mut a, 40).unwrap_err();
    assert!(matches!(err, StencilError::PlanMismatch { .. }), "{err}");
    let after: Vec<Vec<f64>> = (0..a.ring_depth() as i64).map(|t| a.slice(t)).collect();
    assert_eq!(before, after);
}

#[test]
fn scenario_c_domain_mismatch_leaves_array_untouched() {
    let stencil = Stencil::new(diamond_kernels(64, 50));
    let a = stencil
        .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    let plan = stencil.gen_plan(a.domain(), a.boundary(), 50).unwrap();

    let mut other = stencil
        .array_with(ArrayConfig::new(vec![48]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut other, 0, 5, 1.0);
    let before = other.slice(0);
    let err = stencil.run_plan(&plan, &mut other).unwrap_err();
    assert!(matches!(err, StencilError::PlanMismatch { .. }), "{err}");
    assert_eq!(other.slice(0), before);
    assert!(other.slice(1).iter().all(|&v| v == 0.0));
}

#[test]
fn loaded_plan_runs_like_generated_plan() {
    let stencil = Stencil::new(heat_2d_kernels())
        .with_generator(small_leaves(32))
        .unwrap();
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![20, 24]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 6, 1e-3);
    let mut b = a.clone();

    let plan = stencil.gen_plan(a.domain(), a.boundary(), 12).unwrap();
    let mut bytes = Vec::new();
    stencil.store_plan(&plan, &mut bytes).unwrap();
    let loaded = stencil.load_plan(bytes.as_slice()).unwrap();

    stencil.run_plan(&plan, &mut a).unwrap();
    stencil.run_plan(&loaded, &mut b).unwrap();
    assert_eq!(a.slice(12), b.slice(12));
}

#[test]
fn zero_fill_inset_domain_matches_sweep() {
    let n = 32;
    let stencil = Stencil::new(heat_5pt_kernels())
        .with_generator(small_leaves(48))
        .unwrap();
    let config = ArrayConfig::new(vec![n, n])
        .domain(Domain::from_bounds(&[(1, n as i64 - 1), (1, n as i64 - 1)]).unwrap())
        .boundary(BoundaryPolicy::ZeroFill);
    let mut a = stencil.array_with(config).unwrap();
    seeded_fill(&mut a, 0, 7, 1.0);

    let max = plan_vs_sweep(&stencil, a.clone(), 20);
    assert_eq!(max, 0.0);

    stencil.run(20, &mut a).unwrap();
    for i in 0..n as i64 {
        for edge in [0, n as i64 - 1] {
            assert_eq!(a.get(20, &[i, edge]).unwrap(), 0.0);
            assert_eq!(a.get(20, &[edge, i]).unwrap(), 0.0);
        }
    }
}

#[test]
fn custom_wrapping_resolver_matches_periodic() {
    let resolver = BoundaryPolicy::<f64>::custom(|view, t, c| {
        let n = view.size(0) as i64;
        let i = if c[0] >= n {
            c[0] - n
        } else if c[0] < 0 {
            c[0] + n
        } else {
            c[0]
        };
        view.get(t, &[i])
    });
    let stencil = Stencil::new(diamond_kernels(64, 24))
        .with_generator(small_leaves(16))
        .unwrap();

    let mut periodic = stencil
        .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    let mut custom = stencil
        .array_with(ArrayConfig::new(vec![64]).boundary(resolver))
        .unwrap();
    seeded_fill(&mut periodic, 0, 8, 1.0);
    seeded_fill(&mut custom, 0, 8, 1.0);

    stencil.run(24, &mut periodic).unwrap();
    stencil.run(24, &mut custom).unwrap();
    assert_eq!(periodic.slice(24), custom.slice(24));
}

#[test]
fn striped_guards_cover_every_cell() {
    let stencil = Stencil::new(star_kernels(&[1, 2], 1, true))
        .with_generator(small_leaves(24))
        .unwrap();
    let mut a = stencil
        .array_with(ArrayConfig::new(vec![13, 17]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut a, 0, 9, 1.0);
    plan_vs_sweep(&stencil, a, 9);
}

#[test]
fn fail_boundary_surfaces_violation() {
    let stencil = Stencil::new(heat_5pt_kernels());
    let mut a = stencil.array(vec![8, 8]).unwrap();
    let err = stencil.run(2, &mut a).unwrap_err();
    assert!(matches!(err, StencilError::BoundaryViolation { .. }), "{err}");
}
