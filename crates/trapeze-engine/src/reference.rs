//! Sequential reference sweep and array comparison.
//!
//! [`sweep`] computes the same cells as a plan run, one timestep at a
//! time in row-major order. It shares the guard, kernel and boundary
//! semantics of the executor, so any plan run must agree with it.

use trapeze_array::Array;
use trapeze_core::{Coord, Element, StencilError};
use trapeze_kernel::GuardedKernelSet;

/// Compute timesteps `1..=timesteps` over the array's domain, time-major.
pub fn sweep<T: Element>(
    kernels: &GuardedKernelSet<T>,
    array: &mut Array<T>,
    timesteps: u64,
) -> Result<(), StencilError> {
    if timesteps == 0 {
        return Err(StencilError::InvalidTimestepCount { requested: 0 });
    }
    let domain = array.domain().clone();
    let array: &Array<T> = array;
    for t in 1..=timesteps as i64 {
        for coord in domain.coords() {
            kernels.apply(t, &coord, array)?;
        }
    }
    Ok(())
}

/// Result of comparing two arrays at one timestep.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    /// Largest absolute cell difference.
    pub max_abs_diff: f64,
    /// Coordinate of the largest difference, if any cell differs.
    pub worst: Option<Coord>,
    /// Number of cells compared.
    pub cells: u64,
    /// Cells whose difference exceeds the tolerance.
    pub mismatches: u64,
}

impl Comparison {
    /// Whether every cell is within tolerance.
    pub fn is_match(&self) -> bool {
        self.mismatches == 0
    }
}

/// Compare `a` and `b` cell by cell over their domain at timestep `t`.
///
/// Returns `InvalidDomain` if the arrays cover different domains.
pub fn compare<T: Element>(
    a: &Array<T>,
    b: &Array<T>,
    t: i64,
    tolerance: f64,
) -> Result<Comparison, StencilError> {
    if a.domain() != b.domain() {
        return Err(StencilError::InvalidDomain {
            reason: format!(
                "cannot compare arrays over {} and {}",
                a.domain(),
                b.domain()
            ),
        });
    }
    let mut result = Comparison {
        max_abs_diff: 0.0,
        worst: None,
        cells: 0,
        mismatches: 0,
    };
    for coord in a.domain().coords() {
        let diff = a.get(t, &coord)?.abs_diff(b.get(t, &coord)?);
        result.cells += 1;
        if diff > tolerance || diff.is_nan() {
            result.mismatches += 1;
        }
        if diff > result.max_abs_diff || (diff.is_nan() && !result.max_abs_diff.is_nan()) {
            result.max_abs_diff = diff;
            result.worst = Some(coord);
        }
    }
    Ok(result)
}
