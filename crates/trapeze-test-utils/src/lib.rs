//! Test utilities for Trapeze development.
//!
//! Provides seeded initial conditions and the kernel sets used by the
//! scenario tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

pub mod fixtures;

pub use fixtures::{
    diamond_kernels, heat_2d_kernels, heat_2d_shape, heat_5pt_kernels, heat_7pt_kernels,
    lagged_1d_kernels, seeded_fill, star_kernels,
};
