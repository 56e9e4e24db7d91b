//! Iteration domains: per-dimension closed-open integer intervals.

use std::fmt;

use smallvec::SmallVec;

use crate::coord::Coord;
use crate::error::StencilError;

/// A closed-open integer interval `[lo, hi)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: i64,
    hi: i64,
}

impl Interval {
    /// Create an interval. Returns `InvalidDomain` unless `lo < hi`.
    pub fn new(lo: i64, hi: i64) -> Result<Self, StencilError> {
        if lo >= hi {
            return Err(StencilError::InvalidDomain {
                reason: format!("interval [{lo}, {hi}) is empty"),
            });
        }
        Ok(Self { lo, hi })
    }

    /// Inclusive lower bound.
    pub fn lo(&self) -> i64 {
        self.lo
    }

    /// Exclusive upper bound.
    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// Number of integers in the interval.
    pub fn width(&self) -> i64 {
        self.hi - self.lo
    }

    /// Whether `x` lies in `[lo, hi)`.
    pub fn contains(&self, x: i64) -> bool {
        self.lo <= x && x < self.hi
    }

    /// Map any integer onto the interval, treating it as a ring.
    pub fn wrap(&self, x: i64) -> i64 {
        self.lo + (x - self.lo).rem_euclid(self.width())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

/// The region of an array updated by a stencil run.
///
/// One [`Interval`] per spatial dimension. Immutable once built. An
/// array's domain defaults to its full extent; a narrower domain leaves
/// the cells outside it untouched (they act as fixed boundary values).
///
/// # Examples
///
/// ```
/// use trapeze_core::{Domain, Interval};
///
/// let d = Domain::new(vec![Interval::new(1, 15).unwrap(), Interval::new(0, 8).unwrap()]).unwrap();
/// assert_eq!(d.rank(), 2);
/// assert_eq!(d.cell_count(), 14 * 8);
/// assert!(d.contains(&[1, 7]));
/// assert!(!d.contains(&[0, 7]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Domain {
    intervals: SmallVec<[Interval; 4]>,
}

impl Domain {
    /// Build a domain from per-dimension intervals.
    ///
    /// Returns `InvalidDomain` if `intervals` is empty.
    pub fn new(intervals: impl IntoIterator<Item = Interval>) -> Result<Self, StencilError> {
        let intervals: SmallVec<[Interval; 4]> = intervals.into_iter().collect();
        if intervals.is_empty() {
            return Err(StencilError::InvalidDomain {
                reason: "a domain needs at least one dimension".to_string(),
            });
        }
        Ok(Self { intervals })
    }

    /// Domain covering `[0, n)` in every dimension of `sizes`.
    pub fn from_sizes(sizes: &[usize]) -> Result<Self, StencilError> {
        let intervals = sizes
            .iter()
            .map(|&n| Interval::new(0, n as i64))
            .collect::<Result<SmallVec<[Interval; 4]>, _>>()?;
        Self::new(intervals)
    }

    /// Build a domain from `(lo, hi)` pairs.
    pub fn from_bounds(bounds: &[(i64, i64)]) -> Result<Self, StencilError> {
        let intervals = bounds
            .iter()
            .map(|&(lo, hi)| Interval::new(lo, hi))
            .collect::<Result<SmallVec<[Interval; 4]>, _>>()?;
        Self::new(intervals)
    }

    /// Number of spatial dimensions.
    pub fn rank(&self) -> usize {
        self.intervals.len()
    }

    /// The interval of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= rank()`.
    pub fn interval(&self, dim: usize) -> Interval {
        self.intervals[dim]
    }

    /// All intervals in dimension order.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> u64 {
        self.intervals.iter().map(|i| i.width() as u64).product()
    }

    /// Whether `coord` lies inside the domain.
    pub fn contains(&self, coord: &[i64]) -> bool {
        coord.len() == self.rank()
            && self
                .intervals
                .iter()
                .zip(coord)
                .all(|(iv, &x)| iv.contains(x))
    }

    /// Whether the domain fits inside an array of extents `sizes`.
    pub fn fits(&self, sizes: &[usize]) -> bool {
        sizes.len() == self.rank()
            && self
                .intervals
                .iter()
                .zip(sizes)
                .all(|(iv, &n)| iv.lo >= 0 && iv.hi <= n as i64)
    }

    /// Iterate all coordinates in row-major order (last dimension fastest).
    pub fn coords(&self) -> DomainCoords<'_> {
        DomainCoords {
            domain: self,
            next: Some(self.intervals.iter().map(|i| i.lo).collect()),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{iv}")?;
        }
        Ok(())
    }
}

/// Row-major iterator over the coordinates of a [`Domain`].
pub struct DomainCoords<'a> {
    domain: &'a Domain,
    next: Option<Coord>,
}

impl Iterator for DomainCoords<'_> {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        for dim in (0..succ.len()).rev() {
            succ[dim] += 1;
            if succ[dim] < self.domain.intervals[dim].hi {
                self.next = Some(succ);
                return Some(current);
            }
            succ[dim] = self.domain.intervals[dim].lo;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_interval_rejected() {
        assert!(matches!(
            Interval::new(3, 3),
            Err(StencilError::InvalidDomain { .. })
        ));
        assert!(Interval::new(4, 3).is_err());
    }

    #[test]
    fn interval_bounds_are_read_only() {
        let iv = Interval::new(-3, 5).unwrap();
        assert_eq!((iv.lo(), iv.hi(), iv.width()), (-3, 5, 8));
        let d = Domain::from_bounds(&[(1, 15), (0, 4)]).unwrap();
        assert_eq!(d.interval(0).lo(), 1);
        assert_eq!(d.interval(1).hi(), 4);
    }

    #[test]
    fn zero_rank_rejected() {
        assert!(Domain::new(Vec::new()).is_err());
        assert!(Domain::from_sizes(&[4, 0]).is_err());
    }

    #[test]
    fn coords_row_major() {
        let d = Domain::from_bounds(&[(0, 2), (5, 8)]).unwrap();
        let all: Vec<Vec<i64>> = d.coords().map(|c| c.to_vec()).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 5],
                vec![0, 6],
                vec![0, 7],
                vec![1, 5],
                vec![1, 6],
                vec![1, 7]
            ]
        );
    }

    #[test]
    fn fits_checks_extent() {
        let d = Domain::from_bounds(&[(1, 15), (1, 15)]).unwrap();
        assert!(d.fits(&[16, 16]));
        assert!(!d.fits(&[14, 16]));
        assert!(!d.fits(&[16]));
    }

    proptest! {
        #[test]
        fn wrap_lands_inside(lo in -50i64..50, w in 1i64..40, x in -1000i64..1000) {
            let iv = Interval::new(lo, lo + w).unwrap();
            let y = iv.wrap(x);
            prop_assert!(iv.contains(y));
            prop_assert_eq!((y - x).rem_euclid(w), 0);
        }

        #[test]
        fn coords_count_matches_cell_count(a in 1i64..6, b in 1i64..6, c in 1i64..4) {
            let d = Domain::from_bounds(&[(0, a), (-2, b - 2), (3, 3 + c)]).unwrap();
            prop_assert_eq!(d.coords().count() as u64, d.cell_count());
        }
    }
}
