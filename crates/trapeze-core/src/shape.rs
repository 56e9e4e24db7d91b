//! Stencil shapes and the dependency slopes derived from them.
//!
//! A [`Shape`] lists the `(dt, dx_1..dx_k)` offsets a kernel reads
//! relative to the cell it writes. Plan generation only needs two numbers
//! per dimension out of it: how far a dependency can travel per timestep
//! (the [`Slopes`]) and how many timesteps back a kernel reaches (the
//! depth, which sizes the array's time-slice ring).

use std::fmt;

use smallvec::SmallVec;

use crate::coord::Coord;
use crate::error::StencilError;

/// One relative read: `dt` timesteps back (`dt <= 0`) and `dx` per
/// spatial dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Time offset. Zero only for the written cell itself.
    pub dt: i64,
    /// Spatial offset, one entry per dimension.
    pub dx: Coord,
}

impl Offset {
    /// Create an offset.
    pub fn new(dt: i64, dx: impl Into<Coord>) -> Self {
        Self { dt, dx: dx.into() }
    }
}

/// Per-dimension dependency slopes.
///
/// `slopes[d]` bounds how many cells a value can travel along dimension
/// `d` per timestep. Slopes are integers: a fractional reach such as one
/// cell over two timesteps is rounded up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slopes(SmallVec<[u64; 4]>);

impl Slopes {
    /// All-zero slopes for `rank` dimensions.
    pub fn zero(rank: usize) -> Self {
        Self(SmallVec::from_elem(0, rank))
    }

    /// Wrap explicit per-dimension values.
    pub fn from_vec(values: Vec<u64>) -> Self {
        Self(SmallVec::from_vec(values))
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Slope of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= rank()`.
    pub fn get(&self, dim: usize) -> u64 {
        self.0[dim]
    }

    /// The slopes as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Pointwise maximum with `other`. Ranks must match.
    pub fn merge(&self, other: &Slopes) -> Result<Slopes, StencilError> {
        if self.rank() != other.rank() {
            return Err(StencilError::InvalidShape {
                reason: format!(
                    "cannot merge slopes of rank {} and {}",
                    self.rank(),
                    other.rank()
                ),
            });
        }
        Ok(Slopes(
            self.0.iter().zip(&other.0).map(|(a, b)| *a.max(b)).collect(),
        ))
    }

    /// Whether every slope is `<=` the matching slope of `other`.
    pub fn covered_by(&self, other: &Slopes) -> bool {
        self.rank() == other.rank() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }
}

impl fmt::Display for Slopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}

/// The set of offsets a kernel reads.
///
/// Causal by construction: every offset has `dt <= 0`, and `dt == 0`
/// is only allowed for the written cell (all spatial offsets zero).
///
/// # Examples
///
/// ```
/// use trapeze_core::Shape;
///
/// // 1D three-point stencil: a(t, i) from a(t-1, i-1..=i+1).
/// let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 0], [-1, 1]]).unwrap();
/// assert_eq!(shape.rank(), 1);
/// assert_eq!(shape.max_depth(), 1);
/// assert_eq!(shape.ring_depth(), 2);
/// assert_eq!(shape.slope(0), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    offsets: Vec<Offset>,
    rank: usize,
}

impl Shape {
    /// Build a shape from offsets.
    ///
    /// Returns `InvalidShape` if the list is empty, ranks disagree, or an
    /// offset reads the future or a neighbour at the current timestep.
    pub fn new(offsets: impl IntoIterator<Item = Offset>) -> Result<Self, StencilError> {
        let offsets: Vec<Offset> = offsets.into_iter().collect();
        let first = offsets.first().ok_or_else(|| StencilError::InvalidShape {
            reason: "shape has no offsets".to_string(),
        })?;
        let rank = first.dx.len();
        if rank == 0 {
            return Err(StencilError::InvalidShape {
                reason: "shape offsets need at least one spatial dimension".to_string(),
            });
        }
        for off in &offsets {
            if off.dx.len() != rank {
                return Err(StencilError::InvalidShape {
                    reason: format!(
                        "offset {:?} has rank {}, expected {rank}",
                        off,
                        off.dx.len()
                    ),
                });
            }
            if off.dt > 0 {
                return Err(StencilError::InvalidShape {
                    reason: format!("offset {off:?} reads a future timestep (dt > 0)"),
                });
            }
            if off.dt == 0 && off.dx.iter().any(|&x| x != 0) {
                return Err(StencilError::InvalidShape {
                    reason: format!(
                        "offset {off:?} reads a neighbour at the current timestep"
                    ),
                });
            }
        }
        Ok(Self { offsets, rank })
    }

    /// Build a shape from `[dt, dx_1, .., dx_k]` rows.
    pub fn from_rows<const N: usize>(rows: &[[i64; N]]) -> Result<Self, StencilError> {
        if N < 2 {
            return Err(StencilError::InvalidShape {
                reason: "rows need a time offset and at least one spatial offset".to_string(),
            });
        }
        Self::new(
            rows.iter()
                .map(|row| Offset::new(row[0], Coord::from_slice(&row[1..]))),
        )
    }

    /// Number of spatial dimensions.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The declared offsets, in declaration order.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Deepest time offset, `max(-dt)`.
    pub fn max_depth(&self) -> u64 {
        self.offsets
            .iter()
            .map(|o| o.dt.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Minimum number of time slices an array needs for this shape.
    pub fn ring_depth(&self) -> usize {
        1 + self.max_depth() as usize
    }

    /// Dependency slope of dimension `dim`:
    /// `max |dx| / max(1, -dt)`, rounded up.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= rank()`.
    pub fn slope(&self, dim: usize) -> u64 {
        assert!(dim < self.rank, "dimension {dim} out of range for rank {}", self.rank);
        self.offsets
            .iter()
            .map(|o| {
                let steps = o.dt.unsigned_abs().max(1);
                o.dx[dim].unsigned_abs().div_ceil(steps)
            })
            .max()
            .unwrap_or(0)
    }

    /// Slopes for every dimension.
    pub fn slopes(&self) -> Slopes {
        Slopes((0..self.rank).map(|d| self.slope(d)).collect())
    }

    /// Whether `(dt, dx)` is one of the declared offsets.
    pub fn contains(&self, dt: i64, dx: &[i64]) -> bool {
        self.offsets
            .iter()
            .any(|o| o.dt == dt && o.dx.as_slice() == dx)
    }
}
