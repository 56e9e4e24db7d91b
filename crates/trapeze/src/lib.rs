//! Trapeze: cache-oblivious stencil computation over multi-dimensional
//! arrays.
//!
//! This is the facade crate that re-exports the public API of the Trapeze
//! sub-crates. A stencil run is a kernel set, an array with a boundary
//! policy, and a plan: a recursive space-time decomposition of the
//! iteration space into trapezoidal tiles that can be stored and reloaded.
//!
//! # Quick start
//!
//! ```rust
//! use trapeze::prelude::*;
//!
//! // 1-D three-point average on a periodic ring of 128 cells.
//! let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 0], [-1, 1]]).unwrap();
//! let mut kernels = GuardedKernelSet::<f64>::new(1);
//! kernels
//!     .register("avg", Guard::always(), vec![Kernel::<f64>::new(shape, |ctx| {
//!         Ok((ctx.at(-1, &[-1])? + ctx.at(-1, &[0])? + ctx.at(-1, &[1])?) / 3.0)
//!     })])
//!     .unwrap();
//! let stencil = Stencil::new(kernels);
//!
//! let mut array = stencil
//!     .array_with(ArrayConfig::new(vec![128]).boundary(BoundaryPolicy::Periodic))
//!     .unwrap();
//! array.fill_with(0, |c| if c[0] == 64 { 3.0 } else { 0.0 });
//!
//! let plan = stencil.gen_plan(array.domain(), array.boundary(), 20).unwrap();
//! let metrics = stencil.run_plan(&plan, &mut array).unwrap();
//! assert_eq!(metrics.cells, 128 * 20);
//!
//! let total: f64 = array.slice(20).iter().sum();
//! assert!((total - 3.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `trapeze-core` | domains, shapes, slopes, errors |
//! | [`array`] | `trapeze-array` | ring-buffered arrays and boundary policies |
//! | [`kernel`] | `trapeze-kernel` | kernels, guards, guarded kernel sets |
//! | [`plan`] | `trapeze-plan` | plan trees, generator, plan store |
//! | [`engine`] | `trapeze-engine` | executor, reference sweep, [`engine::Stencil`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Domains, shapes, slopes and error types (`trapeze-core`).
pub use trapeze_core as types;

/// Ring-buffered arrays and boundary policies (`trapeze-array`).
pub use trapeze_array as array;

/// Kernels, guards and guarded kernel sets (`trapeze-kernel`).
pub use trapeze_kernel as kernel;

/// Plan trees, the plan generator and the plan store (`trapeze-plan`).
///
/// [`plan::Plan`] is the serializable decomposition; [`plan::PlanStore`]
/// writes and reads it.
pub use trapeze_plan as plan;

/// Plan execution, the reference sweep and the [`engine::Stencil`] facade
/// (`trapeze-engine`).
pub use trapeze_engine as engine;

/// Common imports for typical Trapeze usage.
///
/// ```rust
/// use trapeze::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use trapeze_core::{Coord, Domain, Element, Interval, Offset, Shape, Slopes};

    // Errors
    pub use trapeze_core::{ConfigError, StencilError};

    // Arrays
    pub use trapeze_array::{Array, ArrayConfig, ArrayView, BoundaryPolicy};

    // Kernels
    pub use trapeze_kernel::{Guard, GuardedKernelSet, Kernel, KernelCtx};

    // Plans
    pub use trapeze_plan::{GeneratorConfig, Plan, PlanGenerator, PlanStore};

    // Engine
    pub use trapeze_engine::{
        compare, sweep, Comparison, ExecutorConfig, PlanExecutor, RunMetrics, Stencil,
    };
}
