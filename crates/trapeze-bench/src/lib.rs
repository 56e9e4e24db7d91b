//! Benchmark profiles for the Trapeze stencil engine.
//!
//! Each profile returns a configured [`Stencil`] and a seeded array:
//!
//! - [`reference_profile`]: 2-D heat on a 256x256 periodic grid
//! - [`stress_profile`]: 2-D heat on a 1024x1024 periodic grid
//! - [`diamond_profile`]: 1-D guarded stencil, 1M cells

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use trapeze_array::{Array, ArrayConfig, BoundaryPolicy};
use trapeze_engine::Stencil;
use trapeze_test_utils::{diamond_kernels, heat_2d_kernels, seeded_fill};

/// Timesteps the profiles are sized for.
pub const PROFILE_TIMESTEPS: u64 = 64;

fn heat_profile(n: usize, seed: u64) -> (Stencil<f64>, Array<f64>) {
    let stencil = Stencil::new(heat_2d_kernels());
    let mut array = stencil
        .array_with(ArrayConfig::new(vec![n, n]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut array, 0, seed, 1e-6);
    (stencil, array)
}

/// 2-D heat, 256x256 cells (~65K), slopes (2, 3).
pub fn reference_profile(seed: u64) -> (Stencil<f64>, Array<f64>) {
    heat_profile(256, seed)
}

/// 2-D heat, 1024x1024 cells (~1M).
pub fn stress_profile(seed: u64) -> (Stencil<f64>, Array<f64>) {
    heat_profile(1024, seed)
}

/// The 1-D two-region guarded stencil over 2^20 cells.
pub fn diamond_profile(seed: u64) -> (Stencil<f64>, Array<f64>) {
    let n = 1 << 20;
    let stencil = Stencil::new(diamond_kernels(n as i64, PROFILE_TIMESTEPS as i64));
    let mut array = stencil
        .array_with(ArrayConfig::new(vec![n]).boundary(BoundaryPolicy::Periodic))
        .unwrap();
    seeded_fill(&mut array, 0, seed, 1.0);
    (stencil, array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapeze_engine::{compare, sweep};

    #[test]
    fn profiles_are_periodic_and_seeded() {
        let (stencil, a) = reference_profile(42);
        assert_eq!(a.sizes(), &[256, 256]);
        assert!(a.boundary().wraps());
        assert_eq!(stencil.kernels().slopes().as_slice(), &[2, 3]);
        let (_, b) = reference_profile(42);
        assert_eq!(a.slice(0), b.slice(0));
    }

    #[test]
    fn reference_profile_plan_matches_sweep() {
        let (stencil, mut a) = reference_profile(7);
        let mut b = a.clone();
        stencil.run(8, &mut a).unwrap();
        sweep(stencil.kernels(), &mut b, 8).unwrap();
        assert!(compare(&a, &b, 8, 1e-6).unwrap().is_match());
    }
}
