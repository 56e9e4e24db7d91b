//! Guarded stencil kernels for the Trapeze stencil engine.
//!
//! A [`Kernel`] computes one cell of timestep `t` from the cells its
//! [`Shape`](trapeze_core::Shape) declares. A [`Guard`] decides where a
//! kernel applies. A [`GuardedKernelSet`] holds guarded entries in
//! registration order and resolves each `(t, coords)` to exactly one
//! kernel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod guard;
pub mod kernel;
pub mod set;

pub use context::KernelCtx;
pub use guard::Guard;
pub use kernel::{Kernel, KernelFn};
pub use set::GuardedKernelSet;
