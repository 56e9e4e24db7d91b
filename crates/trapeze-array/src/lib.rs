//! Versioned array storage for Trapeze stencil computations.
//!
//! An [`Array`] holds a fixed-depth ring of time slices over an
//! N-dimensional grid. Logical timestep `t` maps to physical slice
//! `t mod R`, where the ring depth `R` is derived from the deepest shape
//! the array will serve. Out-of-range reads are routed through the
//! array's [`BoundaryPolicy`].
//!
//! # Sharing
//!
//! Cells are stored as atomic 64-bit words so that a single `&Array` can
//! be handed to many fork-join workers during plan execution. Writers are
//! kept apart by the plan itself, not by locks; the joins between plan
//! nodes provide the happens-before edges.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod boundary;
pub mod config;

pub use array::{Array, ArrayView};
pub use boundary::{BoundaryPolicy, Resolver};
pub use config::ArrayConfig;
