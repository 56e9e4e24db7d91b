//! Read context passed to kernels.
//!
//! [`KernelCtx`] identifies the cell being written and gives the kernel
//! read access to the array. Relative reads through [`KernelCtx::at`] are
//! checked against the kernel's declared [`Shape`]; a plan is only
//! correct for reads its shape admits, so an undeclared read fails.

use trapeze_array::ArrayView;
use trapeze_core::coord::offset_coord;
use trapeze_core::{Element, Shape, StencilError};

/// Execution context for one kernel invocation.
pub struct KernelCtx<'a, T> {
    t: i64,
    coords: &'a [i64],
    shape: &'a Shape,
    view: ArrayView<'a, T>,
}

impl<'a, T: Element> KernelCtx<'a, T> {
    /// Construct a context for the cell `(t, coords)`.
    ///
    /// Typically called by [`GuardedKernelSet::apply`](crate::GuardedKernelSet::apply),
    /// not by kernels.
    pub fn new(t: i64, coords: &'a [i64], shape: &'a Shape, view: ArrayView<'a, T>) -> Self {
        Self {
            t,
            coords,
            shape,
            view,
        }
    }

    /// Timestep being computed.
    pub fn t(&self) -> i64 {
        self.t
    }

    /// Coordinates of the cell being written.
    pub fn coords(&self) -> &'a [i64] {
        self.coords
    }

    /// Coordinate of the written cell along `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is out of range.
    pub fn coord(&self, dim: usize) -> i64 {
        self.coords[dim]
    }

    /// Relative read of `a(t + dt, coords + dx)`.
    ///
    /// Returns `InvalidShape` if `(dt, dx)` is not declared in the kernel's
    /// shape. Out-of-range coordinates go through the boundary policy.
    pub fn at(&self, dt: i64, dx: &[i64]) -> Result<T, StencilError> {
        if !self.shape.contains(dt, dx) {
            return Err(StencilError::InvalidShape {
                reason: format!(
                    "kernel read at offset (dt={dt}, dx={dx:?}) is not declared in its shape"
                ),
            });
        }
        let target = offset_coord(self.coords, dx);
        self.view.read(self.t + dt, &target)
    }

    /// Absolute read of `a(t, coords)`.
    ///
    /// Not checked against the shape; the caller is responsible for only
    /// reaching cells the shape covers.
    pub fn get(&self, t: i64, coords: &[i64]) -> Result<T, StencilError> {
        self.view.read(t, coords)
    }

    /// The underlying array view.
    pub fn view(&self) -> ArrayView<'a, T> {
        self.view
    }
}
