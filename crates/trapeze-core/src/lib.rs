//! Core types and traits for the Trapeze stencil engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the
//! [`Coord`] alias, the [`Element`] value trait, stencil [`Shape`]s and
//! their dependency [`Slopes`], iteration [`Domain`]s, and the error
//! taxonomy shared by every other crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod domain;
pub mod element;
pub mod error;
pub mod shape;

pub use coord::Coord;
pub use domain::{Domain, Interval};
pub use element::Element;
pub use error::{ConfigError, StencilError};
pub use shape::{Offset, Shape, Slopes};
