//! Boundary policies: what an out-of-range read returns.

use std::fmt;
use std::sync::Arc;

use trapeze_core::{Coord, Element, StencilError};

use crate::array::ArrayView;

/// A user-supplied boundary resolver.
///
/// Called with the array, the logical timestep of the read and the
/// out-of-range coordinate. The resolver may read in-range cells through
/// [`ArrayView::get`]; it must not call [`ArrayView::read`] with an
/// out-of-range coordinate, which would recurse into itself.
pub type Resolver<T> =
    Arc<dyn Fn(&ArrayView<'_, T>, i64, &[i64]) -> Result<T, StencilError> + Send + Sync>;

/// How an array answers reads outside its spatial extent.
///
/// Stateless; only consulted when at least one coordinate of a read
/// falls outside `[0, size)` for its dimension.
///
/// # Examples
///
/// ```
/// use trapeze_array::{Array, ArrayConfig, BoundaryPolicy};
///
/// let config = ArrayConfig::new(vec![4]).boundary(BoundaryPolicy::Periodic);
/// let mut a = Array::new(config, 2).unwrap();
/// a.set(0, &[3], 7.0f64).unwrap();
/// assert_eq!(a.read(0, &[-1]).unwrap(), 7.0);
/// assert_eq!(a.read(0, &[7]).unwrap(), 7.0);
/// ```
pub enum BoundaryPolicy<T> {
    /// Wrap each out-of-range coordinate modulo its dimension's extent.
    Periodic,
    /// Return the additive identity.
    ZeroFill,
    /// Delegate to a user resolver.
    Custom(Resolver<T>),
    /// Reject the read with [`StencilError::BoundaryViolation`].
    Fail,
}

impl<T: Element> BoundaryPolicy<T> {
    /// Wrap a closure as a [`BoundaryPolicy::Custom`] policy.
    pub fn custom<F>(resolver: F) -> Self
    where
        F: Fn(&ArrayView<'_, T>, i64, &[i64]) -> Result<T, StencilError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(resolver))
    }

    /// Resolve an out-of-range read.
    pub fn resolve(
        &self,
        view: &ArrayView<'_, T>,
        t: i64,
        coords: &[i64],
    ) -> Result<T, StencilError> {
        match self {
            Self::Periodic => {
                let wrapped: Coord = coords
                    .iter()
                    .zip(view.sizes())
                    .map(|(&x, &n)| x.rem_euclid(n as i64))
                    .collect();
                view.get(t, &wrapped)
            }
            Self::ZeroFill => Ok(T::zero()),
            Self::Custom(resolver) => resolver(view, t, coords),
            Self::Fail => Err(StencilError::BoundaryViolation {
                t,
                coord: Coord::from_slice(coords),
            }),
        }
    }

    /// Whether reads through this policy may wrap around to the far side
    /// of the domain.
    ///
    /// Plan generation treats every dimension of a wrapping array as a
    /// ring. Custom resolvers are assumed to wrap since they may read any
    /// in-range cell.
    pub fn wraps(&self) -> bool {
        matches!(self, Self::Periodic | Self::Custom(_))
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::ZeroFill => "zero_fill",
            Self::Custom(_) => "custom",
            Self::Fail => "fail",
        }
    }
}

impl<T> Clone for BoundaryPolicy<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Periodic => Self::Periodic,
            Self::ZeroFill => Self::ZeroFill,
            Self::Custom(r) => Self::Custom(Arc::clone(r)),
            Self::Fail => Self::Fail,
        }
    }
}

impl<T> fmt::Debug for BoundaryPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Periodic => write!(f, "Periodic"),
            Self::ZeroFill => write!(f, "ZeroFill"),
            Self::Custom(_) => write!(f, "Custom(..)"),
            Self::Fail => write!(f, "Fail"),
        }
    }
}

impl<T> Default for BoundaryPolicy<T> {
    fn default() -> Self {
        Self::Fail
    }
}
