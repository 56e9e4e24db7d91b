//! Reusable stencil fixtures.
//!
//! - [`seeded_fill`]: deterministic initial conditions.
//! - [`diamond_kernels`]: 1-D irregular stencil, two guarded regions with
//!   cycling kernels.
//! - [`heat_2d_kernels`]: 2-D heat equation on the asymmetric 12-point
//!   shape with slopes `(2, 3)`.
//! - [`heat_5pt_kernels`]: 2-D five-point heat equation, used with a
//!   zero-fill boundary on an inset domain.
//! - [`heat_7pt_kernels`]: five-point heat equation declared on a 7-point
//!   shape with one diagonal read.
//! - [`lagged_1d_kernels`]: 1-D stencil reading up to three steps back
//!   through an asymmetric shape.
//! - [`star_kernels`]: averaging stencil of arbitrary rank, reach and
//!   depth, for property tests.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use trapeze_array::Array;
use trapeze_core::{Coord, Offset, Shape};
use trapeze_kernel::{Guard, GuardedKernelSet, Kernel, KernelCtx};

fn shape(rows: &[[i64; 2]]) -> Shape {
    Shape::from_rows(rows).expect("fixture shape is valid")
}

/// Fill timestep `t` of `array` with seeded values in `[0, 1024) * scale`.
///
/// Cells outside the array's iteration domain are set to zero, which is
/// how the zero-padded benchmarks prepare their halo.
pub fn seeded_fill(array: &mut Array<f64>, t: i64, seed: u64, scale: f64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let domain = array.domain().clone();
    array.fill_with(t, |c| {
        if domain.contains(c) {
            (rng.next_u32() % 1024) as f64 * scale
        } else {
            0.0
        }
    });
}

// ── Diamond ─────────────────────────────────────────────────────

/// The 1-D irregular stencil over `n` cells and `timesteps` steps.
///
/// The `interior` guard holds for `t > timesteps / 2 && i > n / 2`; the
/// `exterior` guard is its negation. Interior cycles three kernels,
/// exterior two.
pub fn diamond_kernels(n: i64, timesteps: i64) -> GuardedKernelSet<f64> {
    let rows = [[0, 0], [-1, -1], [-1, 0], [-1, 1]];
    let three = |w: [f64; 3], c: f64| {
        Kernel::new(shape(&rows), move |ctx: &KernelCtx<'_, f64>| {
            let a = |dx: i64| ctx.at(-1, &[dx]);
            Ok(w[0] * a(-1)? + w[1] * a(0)? + w[2] * a(1)? + c)
        })
    };
    let interior = Guard::new(move |t, c| t > timesteps / 2 && c[0] > n / 2);
    let exterior = interior.negate();

    let mut set = GuardedKernelSet::new(1);
    set.register(
        "interior",
        interior,
        vec![
            three([0.1, 0.15, 0.189], 0.8),
            three([0.2, 0.25, 0.289], 0.8),
            three([0.3, 0.35, 0.389], 0.8),
        ],
    )
    .expect("interior entry registers");
    set.register(
        "exterior",
        exterior,
        vec![
            three([0.1, -0.15, -0.189], -0.1),
            three([0.2, -0.25, -0.289], -0.8),
        ],
    )
    .expect("exterior entry registers");
    set
}

// ── Heat ────────────────────────────────────────────────────────

/// The 12-offset 2-D heat shape: reach 2 in dimension 0, 3 in dimension 1.
pub fn heat_2d_shape() -> Shape {
    Shape::from_rows(&[
        [0, 0, 0],
        [-1, 1, 0],
        [-1, 2, 0],
        [-1, 0, 0],
        [-1, -1, 0],
        [-1, -2, 0],
        [-1, 0, -1],
        [-1, 0, -2],
        [-1, 0, -3],
        [-1, 0, 1],
        [-1, 0, 2],
        [-1, 0, 3],
    ])
    .expect("heat shape is valid")
}

/// Single-kernel 2-D heat equation over [`heat_2d_shape`].
pub fn heat_2d_kernels() -> GuardedKernelSet<f64> {
    let kernel = Kernel::new(heat_2d_shape(), |ctx: &KernelCtx<'_, f64>| {
        let a = |i: i64, j: i64| ctx.at(-1, &[i, j]);
        let c = a(0, 0)?;
        let di = a(2, 0)? + a(1, 0)? - 2.0 * c + a(-1, 0)? + a(-2, 0)?;
        let dj = a(0, 3)? + a(0, 2)? + a(0, 1)? - 2.0 * c + a(0, -1)? + a(0, -2)? + a(0, -3)?;
        Ok(0.125 * di + 0.125 * dj + c)
    });
    let mut set = GuardedKernelSet::new(2);
    set.register("heat", Guard::always(), vec![kernel])
        .expect("heat entry registers");
    set
}

/// Five-point 2-D heat equation.
pub fn heat_5pt_kernels() -> GuardedKernelSet<f64> {
    let shape = Shape::from_rows(&[
        [0, 0, 0],
        [-1, 1, 0],
        [-1, -1, 0],
        [-1, 0, 0],
        [-1, 0, -1],
        [-1, 0, 1],
    ])
    .expect("five-point shape is valid");
    let kernel = Kernel::new(shape, |ctx: &KernelCtx<'_, f64>| {
        let a = |i: i64, j: i64| ctx.at(-1, &[i, j]);
        let c = a(0, 0)?;
        let di = a(1, 0)? - 2.0 * c + a(-1, 0)?;
        let dj = a(0, 1)? - 2.0 * c + a(0, -1)?;
        Ok(0.125 * di + 0.125 * dj + c)
    });
    let mut set = GuardedKernelSet::new(2);
    set.register("heat", Guard::always(), vec![kernel])
        .expect("heat entry registers");
    set
}

/// Five-point heat equation plus a small `(-1, -1)` diagonal term, on the
/// 7-offset shape `{(0,0), (±1,0), (0,±1), (-1,-1)}` read at `t - 1`.
pub fn heat_7pt_kernels() -> GuardedKernelSet<f64> {
    let shape = Shape::from_rows(&[
        [0, 0, 0],
        [-1, 1, 0],
        [-1, -1, 0],
        [-1, -1, -1],
        [-1, 0, -1],
        [-1, 0, 1],
        [-1, 0, 0],
    ])
    .expect("seven-point shape is valid");
    let kernel = Kernel::new(shape, |ctx: &KernelCtx<'_, f64>| {
        let a = |i: i64, j: i64| ctx.at(-1, &[i, j]);
        let c = a(0, 0)?;
        let di = a(1, 0)? - 2.0 * c + a(-1, 0)?;
        let dj = a(0, 1)? - 2.0 * c + a(0, -1)?;
        let diag = a(-1, -1)? - c;
        Ok(0.125 * di + 0.125 * dj + 0.0625 * diag + c)
    });
    let mut set = GuardedKernelSet::new(2);
    set.register("heat", Guard::always(), vec![kernel])
        .expect("heat entry registers");
    set
}

// ── Lagged ──────────────────────────────────────────────────────

/// 1-D stencil over `(-1, ±1)`, `(-2, 0)`, `(-3, -2)` and `(-3, 3)`.
///
/// Slope 1, shape depth 4, so arrays built for it keep a ring of 6.
pub fn lagged_1d_kernels() -> GuardedKernelSet<f64> {
    let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 1], [-2, 0], [-3, -2], [-3, 3]])
        .expect("lagged shape is valid");
    let kernel = Kernel::new(shape, |ctx: &KernelCtx<'_, f64>| {
        let near = ctx.at(-1, &[-1])? + ctx.at(-1, &[1])?;
        let far = ctx.at(-3, &[-2])? - ctx.at(-3, &[3])?;
        Ok(0.3 * near + 0.35 * ctx.at(-2, &[0])? + 0.05 * far)
    });
    let mut set = GuardedKernelSet::new(1);
    set.register("lagged", Guard::always(), vec![kernel])
        .expect("lagged entry registers");
    set
}

// ── Star ────────────────────────────────────────────────────────

/// `(lag, dx)` reads of a star: the centre and `±lag·reach[d]` along each
/// axis, at every lag up to `depth`. Centre at `t - 1` comes first.
fn star_reads(reach: &[u64], depth: u64) -> Vec<(i64, Coord)> {
    let rank = reach.len();
    let mut out = Vec::new();
    for lag in 1..=depth.max(1) as i64 {
        out.push((lag, Coord::from_elem(0, rank)));
        for (d, &r) in reach.iter().enumerate() {
            if r == 0 {
                continue;
            }
            for sign in [-1i64, 1] {
                let mut dx = Coord::from_elem(0, rank);
                dx[d] = sign * lag * r as i64;
                out.push((lag, dx));
            }
        }
    }
    out
}

/// Averaging stencil reading the centre and `±lag·reach[d]` along each
/// axis at `t - lag`, for every lag in `1..=depth`. The kernel set's
/// slopes equal `reach` and its ring depth is `depth + 1`.
///
/// With `striped`, cells with an even first coordinate take the plain
/// average and the rest cycle between two weighted variants.
pub fn star_kernels(reach: &[u64], depth: u64, striped: bool) -> GuardedKernelSet<f64> {
    let reads = star_reads(reach, depth);
    let shape = Shape::new(
        std::iter::once(Offset::new(0, Coord::from_elem(0, reach.len())))
            .chain(reads.iter().map(|(lag, dx)| Offset::new(-lag, dx.clone()))),
    )
    .expect("star shape is valid");

    let weighted = |centre: f64| {
        let reads = reads.clone();
        Kernel::new(shape.clone(), move |ctx: &KernelCtx<'_, f64>| {
            let c = ctx.at(-1, &reads[0].1)?;
            let mut sum = 0.0;
            for (lag, dx) in &reads[1..] {
                sum += ctx.at(-lag, dx)?;
            }
            if reads.len() == 1 {
                return Ok(c * centre + 1.0);
            }
            Ok(centre * c + (1.0 - centre) * sum / (reads.len() - 1) as f64)
        })
    };

    let plain = 1.0 / reads.len() as f64;
    let mut set = GuardedKernelSet::new(reach.len());
    if striped {
        let even = Guard::new(|_, c| c[0].rem_euclid(2) == 0);
        let odd = even.negate();
        set.register("even", even, vec![weighted(plain)])
            .expect("even entry registers");
        set.register("odd", odd, vec![weighted(0.5), weighted(0.25)])
            .expect("odd entry registers");
    } else {
        set.register("star", Guard::always(), vec![weighted(plain)])
            .expect("star entry registers");
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapeze_array::{ArrayConfig, BoundaryPolicy};
    use trapeze_core::Domain;

    #[test]
    fn seeded_fill_is_deterministic_and_zero_pads() {
        let cfg = || {
            ArrayConfig::new(vec![6, 6])
                .domain(Domain::from_bounds(&[(1, 5), (1, 5)]).unwrap())
                .boundary(BoundaryPolicy::ZeroFill)
        };
        let mut a = Array::new(cfg(), 2).unwrap();
        let mut b = Array::new(cfg(), 2).unwrap();
        seeded_fill(&mut a, 0, 7, 1.0);
        seeded_fill(&mut b, 0, 7, 1.0);
        assert_eq!(a.slice(0), b.slice(0));
        assert_eq!(a.get(0, &[0, 3]).unwrap(), 0.0);
        assert_eq!(a.get(0, &[5, 5]).unwrap(), 0.0);
        assert!(a.slice(0).iter().all(|&v| (0.0..1024.0).contains(&v)));
    }

    #[test]
    fn diamond_guards_partition_the_domain() {
        let set = diamond_kernels(64, 32);
        assert_eq!(set.len(), 2);
        assert_eq!(set.slopes().as_slice(), &[1]);
        for t in 1..=32 {
            for i in 0..64 {
                assert!(set.select(t, &[i]).is_ok());
            }
        }
    }

    #[test]
    fn heat_shape_reach() {
        let s = heat_2d_shape();
        assert_eq!(s.offsets().len(), 12);
        assert_eq!(s.slopes().as_slice(), &[2, 3]);
        assert_eq!(heat_2d_kernels().ring_depth(), 2);
    }

    #[test]
    fn star_slopes_follow_reach() {
        let flat = star_kernels(&[2, 0, 1], 1, false);
        assert_eq!(flat.slopes().as_slice(), &[2, 0, 1]);
        assert_eq!(flat.ring_depth(), 2);
        let striped = star_kernels(&[1, 1], 1, true);
        assert_eq!(striped.names().collect::<Vec<_>>(), vec!["even", "odd"]);
    }

    #[test]
    fn deep_star_keeps_slopes() {
        let deep = star_kernels(&[2, 1], 3, false);
        assert_eq!(deep.slopes().as_slice(), &[2, 1]);
        assert_eq!(deep.ring_depth(), 4);
        assert_eq!(star_reads(&[2, 1], 3).len(), 15);
        assert_eq!(star_kernels(&[0], 2, true).ring_depth(), 3);
    }

    #[test]
    fn lagged_and_seven_point_shapes() {
        let lagged = lagged_1d_kernels();
        assert_eq!(lagged.slopes().as_slice(), &[1]);
        assert_eq!(lagged.ring_depth(), 4);
        assert_eq!(Array::<f64>::ring_for(lagged.ring_depth()), 6);
        let seven = heat_7pt_kernels();
        assert_eq!(seven.slopes().as_slice(), &[1, 1]);
        assert_eq!(seven.ring_depth(), 2);
    }
}
