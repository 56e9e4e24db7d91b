//! Plan execution for the Trapeze stencil engine.
//!
//! [`PlanExecutor`] walks a [`Plan`](trapeze_plan::Plan) over an
//! [`Array`](trapeze_array::Array), forking independent tiles onto the
//! rayon pool. [`Stencil`] bundles a kernel set with plan generation,
//! storage and execution. The [`reference`] module holds the sequential
//! sweep every plan run must agree with.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod executor;
pub mod metrics;
pub mod reference;
pub mod stencil;

pub use config::ExecutorConfig;
pub use executor::PlanExecutor;
pub use metrics::RunMetrics;
pub use reference::{compare, sweep, Comparison};
pub use stencil::Stencil;
