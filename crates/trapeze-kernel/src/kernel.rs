//! The [`Kernel`] type: a shape plus the function that evaluates it.

use std::fmt;
use std::sync::Arc;

use trapeze_core::{Element, Shape, StencilError};

use crate::context::KernelCtx;

/// Signature of a kernel body.
///
/// The returned value is written to the cell the context identifies, so a
/// kernel writes exactly one cell per call.
pub type KernelFn<T> = Arc<dyn Fn(&KernelCtx<'_, T>) -> Result<T, StencilError> + Send + Sync>;

/// A stencil kernel: the offsets it reads and how it combines them.
///
/// # Examples
///
/// ```
/// use trapeze_core::Shape;
/// use trapeze_kernel::Kernel;
///
/// let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 0], [-1, 1]]).unwrap();
/// let avg = Kernel::<f64>::new(shape, |ctx| {
///     Ok((ctx.at(-1, &[-1])? + ctx.at(-1, &[0])? + ctx.at(-1, &[1])?) / 3.0)
/// });
/// assert_eq!(avg.shape().slope(0), 1);
/// ```
pub struct Kernel<T> {
    shape: Shape,
    body: KernelFn<T>,
}

impl<T: Element> Kernel<T> {
    /// Create a kernel from its shape and body.
    pub fn new<F>(shape: Shape, body: F) -> Self
    where
        F: Fn(&KernelCtx<'_, T>) -> Result<T, StencilError> + Send + Sync + 'static,
    {
        Self {
            shape,
            body: Arc::new(body),
        }
    }

    /// The declared read offsets.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Evaluate the kernel for the cell in `ctx`.
    pub fn eval(&self, ctx: &KernelCtx<'_, T>) -> Result<T, StencilError> {
        (self.body)(ctx)
    }
}

impl<T> Clone for Kernel<T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> fmt::Debug for Kernel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
