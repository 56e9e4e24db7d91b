//! Space-time decomposition plans for the Trapeze stencil engine.
//!
//! A [`Plan`] is a tree of trapezoidal tiles over `(t, x_1..x_k)` that
//! covers every cell of a domain for timesteps `1..=T` exactly once.
//! Sibling tiles in the same wave of a space cut never depend on each
//! other, so an executor may run them concurrently.
//!
//! # Architecture
//!
//! - [`PlanGenerator`] derives a plan from a domain, dependency slopes
//!   and a timestep count
//! - [`PlanStore`] writes plans to any `Write` sink and reads them back
//!   from any `Read` source
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "TRPZ"] [VERSION u8] [rank u32] [bounds] [T u64] [slopes]
//! [node count u64] [node 1] [node 2] ... [node N]      (pre-order)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod generator;
pub mod plan;
pub mod store;

pub use config::GeneratorConfig;
pub use generator::PlanGenerator;
pub use plan::{Extent, NodeKind, Plan, TileNode};
pub use store::PlanStore;

/// Magic bytes at the start of every stored plan.
pub const MAGIC: [u8; 4] = *b"TRPZ";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
