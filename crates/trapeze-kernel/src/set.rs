//! [`GuardedKernelSet`]: the ordered guard → kernels table.

use indexmap::IndexMap;
use trapeze_array::Array;
use trapeze_core::{Coord, Element, Slopes, StencilError};

use crate::context::KernelCtx;
use crate::guard::Guard;
use crate::kernel::Kernel;

/// One registered entry: a guard and the kernels it cycles through.
#[derive(Clone, Debug)]
struct Entry<T> {
    guard: Guard,
    kernels: Vec<Kernel<T>>,
}

/// An ordered set of guarded kernel entries for one array rank.
///
/// Each entry pairs a [`Guard`] with one or more kernels. At timestep `t`
/// an entry with `n` kernels applies kernel `(t - 1) mod n`, so a single
/// kernel applies every step and several kernels take turns. Selection
/// picks the first entry, in registration order, whose guard matches.
///
/// # Examples
///
/// ```
/// use trapeze_core::Shape;
/// use trapeze_kernel::{Guard, GuardedKernelSet, Kernel};
///
/// let shape = Shape::from_rows(&[[0, 0], [-1, 0]]).unwrap();
/// let mut set = GuardedKernelSet::<f64>::new(1);
/// set.register("copy", Guard::always(), vec![Kernel::new(shape, |ctx| ctx.at(-1, &[0]))])
///     .unwrap();
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.ring_depth(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct GuardedKernelSet<T> {
    rank: usize,
    entries: IndexMap<String, Entry<T>>,
}

impl<T: Element> GuardedKernelSet<T> {
    /// Create an empty set for arrays of `rank` dimensions.
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            entries: IndexMap::new(),
        }
    }

    /// Append a guarded entry.
    ///
    /// Returns `DuplicateKernel` if `name` is taken, and `InvalidShape` if
    /// `kernels` is empty or any kernel's rank differs from the set's.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        guard: Guard,
        kernels: Vec<Kernel<T>>,
    ) -> Result<&mut Self, StencilError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(StencilError::DuplicateKernel { name });
        }
        if kernels.is_empty() {
            return Err(StencilError::InvalidShape {
                reason: format!("entry '{name}' has no kernels"),
            });
        }
        if let Some(k) = kernels.iter().find(|k| k.shape().rank() != self.rank) {
            return Err(StencilError::InvalidShape {
                reason: format!(
                    "entry '{name}' has a kernel of rank {}, set rank is {}",
                    k.shape().rank(),
                    self.rank
                ),
            });
        }
        self.entries.insert(name, Entry { guard, kernels });
        Ok(self)
    }

    /// Array rank the set serves.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn kernels(&self) -> impl Iterator<Item = &Kernel<T>> {
        self.entries.values().flat_map(|e| e.kernels.iter())
    }

    /// Pointwise maximum slopes over every registered kernel.
    pub fn slopes(&self) -> Slopes {
        self.kernels()
            .map(|k| k.shape().slopes())
            .fold(Slopes::zero(self.rank), |acc, s| {
                // Ranks were checked at registration.
                acc.merge(&s).unwrap_or(acc)
            })
    }

    /// Minimum array ring depth for every registered kernel.
    pub fn ring_depth(&self) -> usize {
        self.kernels()
            .map(|k| k.shape().ring_depth())
            .max()
            .unwrap_or(1)
    }

    /// Kernel responsible for `(t, coords)`.
    ///
    /// Returns `UnguardedCoordinate` if no guard matches.
    pub fn select(&self, t: i64, coords: &[i64]) -> Result<&Kernel<T>, StencilError> {
        self.entries
            .values()
            .find(|e| e.guard.matches(t, coords))
            .map(|e| &e.kernels[(t - 1).rem_euclid(e.kernels.len() as i64) as usize])
            .ok_or_else(|| StencilError::UnguardedCoordinate {
                t,
                coord: Coord::from_slice(coords),
            })
    }

    /// Compute and store `array(t, coords)`.
    pub fn apply(&self, t: i64, coords: &[i64], array: &Array<T>) -> Result<(), StencilError> {
        let kernel = self.select(t, coords)?;
        let ctx = KernelCtx::new(t, coords, kernel.shape(), array.view());
        let value = kernel.eval(&ctx)?;
        array.store(t, coords, value)
    }
}
