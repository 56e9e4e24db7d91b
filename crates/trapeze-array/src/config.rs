//! Array construction parameters.

use trapeze_core::{ConfigError, Domain, StencilError};

use crate::boundary::BoundaryPolicy;

/// Builder input for [`Array::new`](crate::Array::new).
///
/// `sizes` are the spatial extents. `domain` restricts the region a
/// stencil run updates; `None` means the full extent. The boundary
/// policy defaults to [`BoundaryPolicy::Fail`].
#[derive(Clone, Debug)]
pub struct ArrayConfig<T> {
    /// Spatial extents, one per dimension.
    pub sizes: Vec<usize>,
    /// Iteration domain. Default: the full extent.
    pub domain: Option<Domain>,
    /// Out-of-range read policy. Default: [`BoundaryPolicy::Fail`].
    pub boundary: BoundaryPolicy<T>,
}

impl<T> ArrayConfig<T> {
    /// Config for an array of the given extents with default settings.
    pub fn new(sizes: Vec<usize>) -> Self {
        Self {
            sizes,
            domain: None,
            boundary: BoundaryPolicy::Fail,
        }
    }

    /// Restrict the iteration domain.
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the boundary policy.
    pub fn boundary(mut self, boundary: BoundaryPolicy<T>) -> Self {
        self.boundary = boundary;
        self
    }

    /// Check structural invariants and resolve the effective domain.
    pub fn validate(&self) -> Result<Domain, StencilError> {
        if self.sizes.is_empty() || self.sizes.contains(&0) {
            return Err(ConfigError::EmptyArray {
                sizes: self.sizes.clone(),
            }
            .into());
        }
        match &self.domain {
            None => Domain::from_sizes(&self.sizes),
            Some(d) if d.fits(&self.sizes) => Ok(d.clone()),
            Some(d) => Err(StencilError::InvalidDomain {
                reason: format!("domain {d} does not fit array extents {:?}", self.sizes),
            }),
        }
    }
}
