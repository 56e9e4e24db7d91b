//! The versioned N-dimensional [`Array`] and its read-only [`ArrayView`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use trapeze_core::coord::flat_index;
use trapeze_core::{Coord, Domain, Element, StencilError};

use crate::boundary::BoundaryPolicy;
use crate::config::ArrayConfig;

/// An N-dimensional array with a ring of time slices.
///
/// # Ring layout
///
/// ```text
/// data: [slice 0][slice 1] ... [slice R-1]     each slice = prod(sizes) cells
/// logical t  ──►  slice t mod R  (Euclidean, so negative t works)
/// ```
///
/// `R` is derived from the minimum depth `D = 1 + max(-dt)` requested at
/// construction: `R = max(D, 2·(D-1))`. A plain time-major sweep only
/// needs `D` slices; the extra slices for deep shapes keep a trapezoid
/// that reads `D-1` steps back from racing a sibling that overwrites the
/// same slot.
///
/// Cells are stored as atomic words; see the crate docs.
pub struct Array<T> {
    sizes: SmallVec<[usize; 4]>,
    cells_per_slice: usize,
    ring: usize,
    data: Vec<AtomicU64>,
    domain: Domain,
    boundary: BoundaryPolicy<T>,
    _marker: PhantomData<T>,
}

impl<T: Element> Array<T> {
    /// Physical ring depth allocated for a minimum depth of `min_depth`.
    pub fn ring_for(min_depth: usize) -> usize {
        let d = min_depth.max(1);
        d.max(2 * (d - 1))
    }

    /// Create an array holding zeros in every slice.
    ///
    /// `min_depth` is the number of time slices the kernels need, usually
    /// `GuardedKernelSet::ring_depth()`.
    pub fn new(config: ArrayConfig<T>, min_depth: usize) -> Result<Self, StencilError> {
        let domain = config.validate()?;
        let cells_per_slice: usize = config.sizes.iter().product();
        let ring = Self::ring_for(min_depth);
        let zero = T::zero().to_bits();
        let data = (0..cells_per_slice * ring)
            .map(|_| AtomicU64::new(zero))
            .collect();
        Ok(Self {
            sizes: SmallVec::from_vec(config.sizes),
            cells_per_slice,
            ring,
            data,
            domain,
            boundary: config.boundary,
            _marker: PhantomData,
        })
    }

    /// Number of spatial dimensions.
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    /// Spatial extents.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Extent of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= rank()`.
    pub fn size(&self, dim: usize) -> usize {
        self.sizes[dim]
    }

    /// The iteration domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The boundary policy.
    pub fn boundary(&self) -> &BoundaryPolicy<T> {
        &self.boundary
    }

    /// Number of physical time slices.
    pub fn ring_depth(&self) -> usize {
        self.ring
    }

    /// Physical slice holding logical timestep `t`.
    pub fn slot(&self, t: i64) -> usize {
        t.rem_euclid(self.ring as i64) as usize
    }

    /// Whether `coords` lies inside the spatial extent.
    pub fn in_bounds(&self, coords: &[i64]) -> bool {
        flat_index(coords, &self.sizes).is_some()
    }

    fn cell(&self, t: i64, coords: &[i64]) -> Option<&AtomicU64> {
        let idx = flat_index(coords, &self.sizes)?;
        self.data.get(self.slot(t) * self.cells_per_slice + idx)
    }

    fn violation(t: i64, coords: &[i64]) -> StencilError {
        StencilError::BoundaryViolation {
            t,
            coord: Coord::from_slice(coords),
        }
    }

    /// Bounds-checked read. Never consults the boundary policy.
    pub fn get(&self, t: i64, coords: &[i64]) -> Result<T, StencilError> {
        self.cell(t, coords)
            .map(|c| T::from_bits(c.load(Ordering::Relaxed)))
            .ok_or_else(|| Self::violation(t, coords))
    }

    /// Boundary-routed read: in-range coordinates read the cell, others go
    /// through the boundary policy.
    pub fn read(&self, t: i64, coords: &[i64]) -> Result<T, StencilError> {
        match self.cell(t, coords) {
            Some(c) => Ok(T::from_bits(c.load(Ordering::Relaxed))),
            None if coords.len() == self.rank() => {
                self.boundary.resolve(&self.view(), t, coords)
            }
            None => Err(StencilError::InvalidShape {
                reason: format!(
                    "read of rank {} from an array of rank {}",
                    coords.len(),
                    self.rank()
                ),
            }),
        }
    }

    /// Bounds-checked write.
    pub fn set(&mut self, t: i64, coords: &[i64], value: T) -> Result<(), StencilError> {
        self.store(t, coords, value)
    }

    /// Bounds-checked write through a shared reference.
    ///
    /// Used by plan executors, whose workers share one `&Array`. Stores to
    /// distinct cells from different threads are fine; ordering between
    /// threads comes from the caller's joins.
    pub fn store(&self, t: i64, coords: &[i64], value: T) -> Result<(), StencilError> {
        let cell = self
            .cell(t, coords)
            .ok_or_else(|| Self::violation(t, coords))?;
        cell.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Set every cell of timestep `t` from `f(coords)`, over the full extent.
    pub fn fill_with(&mut self, t: i64, mut f: impl FnMut(&[i64]) -> T) {
        let full = Domain::from_sizes(&self.sizes);
        let base = self.slot(t) * self.cells_per_slice;
        if let Ok(full) = full {
            for (idx, coords) in full.coords().enumerate() {
                self.data[base + idx].store(f(&coords).to_bits(), Ordering::Relaxed);
            }
        }
    }

    /// Copy of all cells of timestep `t`, row-major over the full extent.
    pub fn slice(&self, t: i64) -> Vec<T> {
        let base = self.slot(t) * self.cells_per_slice;
        self.data[base..base + self.cells_per_slice]
            .iter()
            .map(|c| T::from_bits(c.load(Ordering::Relaxed)))
            .collect()
    }

    /// Read-only view handed to boundary resolvers and kernels.
    pub fn view(&self) -> ArrayView<'_, T> {
        ArrayView { array: self }
    }
}

impl<T: Element> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self {
            sizes: self.sizes.clone(),
            cells_per_slice: self.cells_per_slice,
            ring: self.ring,
            data: self
                .data
                .iter()
                .map(|c| AtomicU64::new(c.load(Ordering::Relaxed)))
                .collect(),
            domain: self.domain.clone(),
            boundary: self.boundary.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("sizes", &self.sizes)
            .field("ring", &self.ring)
            .field("domain", &self.domain)
            .field("boundary", &self.boundary)
            .finish()
    }
}

/// Read-only access to an [`Array`].
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T> {
    array: &'a Array<T>,
}

impl<'a, T: Element> ArrayView<'a, T> {
    /// Bounds-checked read. See [`Array::get`].
    pub fn get(&self, t: i64, coords: &[i64]) -> Result<T, StencilError> {
        self.array.get(t, coords)
    }

    /// Boundary-routed read. See [`Array::read`].
    pub fn read(&self, t: i64, coords: &[i64]) -> Result<T, StencilError> {
        self.array.read(t, coords)
    }

    /// Spatial extents.
    pub fn sizes(&self) -> &'a [usize] {
        &self.array.sizes
    }

    /// Extent of dimension `dim`.
    pub fn size(&self, dim: usize) -> usize {
        self.array.size(dim)
    }

    /// Number of spatial dimensions.
    pub fn rank(&self) -> usize {
        self.array.rank()
    }
}
