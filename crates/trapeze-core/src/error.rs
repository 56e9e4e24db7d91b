//! Error types for the Trapeze stencil engine.
//!
//! A single taxonomy, [`StencilError`], is shared by shape declaration,
//! array access, kernel dispatch, plan generation, plan persistence and
//! plan execution. Configuration validation has its own [`ConfigError`]
//! which is wrapped by [`StencilError::Config`].

use std::error::Error;
use std::fmt;
use std::io;

use crate::coord::Coord;

/// Errors raised anywhere in the generate / store / load / run cycle.
///
/// Every variant is unrecoverable for the run in progress. Cells written
/// by an aborted run before the error surfaced are unspecified.
#[derive(Debug)]
pub enum StencilError {
    /// A shape has a misdeclared offset, or a kernel read an offset its
    /// shape does not declare.
    InvalidShape {
        /// What is wrong with the shape.
        reason: String,
    },
    /// A domain interval is empty or its rank does not match.
    InvalidDomain {
        /// What is wrong with the domain.
        reason: String,
    },
    /// Plan generation was asked for zero timesteps.
    InvalidTimestepCount {
        /// The requested count.
        requested: u64,
    },
    /// An out-of-range access could not be resolved (`Fail` policy, or a
    /// bounds-checked read outside the array).
    BoundaryViolation {
        /// Logical timestep of the access.
        t: i64,
        /// The offending coordinate.
        coord: Coord,
    },
    /// No guard selected a kernel at this point.
    UnguardedCoordinate {
        /// Logical timestep being computed.
        t: i64,
        /// The coordinate no guard matched.
        coord: Coord,
    },
    /// Persisted plan bytes are malformed.
    PlanCorrupt {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A plan does not fit the array, kernel set or run length it was
    /// given.
    PlanMismatch {
        /// Which check failed.
        reason: String,
    },
    /// Two kernel entries were registered under the same name.
    DuplicateKernel {
        /// The duplicated name.
        name: String,
    },
    /// An I/O error while storing or loading a plan.
    Io(io::Error),
    /// A configuration struct failed validation.
    Config(ConfigError),
}

impl fmt::Display for StencilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
            Self::InvalidDomain { reason } => write!(f, "invalid domain: {reason}"),
            Self::InvalidTimestepCount { requested } => {
                write!(f, "timestep count must be at least 1, got {requested}")
            }
            Self::BoundaryViolation { t, coord } => {
                write!(f, "boundary violation at t={t}, coord {coord:?}")
            }
            Self::UnguardedCoordinate { t, coord } => {
                write!(f, "no guard matched at t={t}, coord {coord:?}")
            }
            Self::PlanCorrupt { detail } => write!(f, "corrupt plan: {detail}"),
            Self::PlanMismatch { reason } => write!(f, "plan mismatch: {reason}"),
            Self::DuplicateKernel { name } => {
                write!(f, "kernel entry '{name}' is already registered")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for StencilError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StencilError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for StencilError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors detected by the `validate()` methods of configuration structs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The leaf volume threshold is zero.
    LeafVolumeZero,
    /// The minimum cut width is below 2 (a cut needs two non-empty sides).
    CutWidthTooSmall {
        /// The configured width.
        configured: i64,
    },
    /// An explicit worker thread count of zero.
    ThreadCountZero,
    /// An array was declared with no dimensions or a zero-sized one.
    EmptyArray {
        /// The declared extents.
        sizes: Vec<usize>,
    },
    /// A worker pool could not be built.
    ThreadPoolFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeafVolumeZero => write!(f, "leaf_volume must be at least 1"),
            Self::CutWidthTooSmall { configured } => {
                write!(f, "min_cut_width {configured} is below minimum of 2")
            }
            Self::ThreadCountZero => write!(f, "threads must be at least 1"),
            Self::EmptyArray { sizes } => {
                write!(f, "array extents {sizes:?} must be non-empty and non-zero")
            }
            Self::ThreadPoolFailed { reason } => {
                write!(f, "worker pool could not be built: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn display_names_the_coordinate() {
        let e = StencilError::UnguardedCoordinate {
            t: 7,
            coord: smallvec![3, -1],
        };
        assert_eq!(e.to_string(), "no guard matched at t=7, coord [3, -1]");
    }

    #[test]
    fn config_error_is_source() {
        let e = StencilError::from(ConfigError::LeafVolumeZero);
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "config: leaf_volume must be at least 1");
    }

    #[test]
    fn io_error_converts() {
        let e: StencilError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(e, StencilError::Io(_)));
    }
}
