//! Guards: predicates that pick which kernel entry covers a cell.

use std::fmt;
use std::sync::Arc;

/// A predicate over `(t, coords)`.
///
/// Guards are pure and cheap to clone. They are evaluated once per cell
/// update, in registration order, until one matches.
#[derive(Clone)]
pub struct Guard(Arc<dyn Fn(i64, &[i64]) -> bool + Send + Sync>);

impl Guard {
    /// Wrap a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(i64, &[i64]) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// A guard that matches every cell.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Evaluate the guard.
    pub fn matches(&self, t: i64, coords: &[i64]) -> bool {
        (self.0)(t, coords)
    }

    /// The complement of this guard.
    ///
    /// `a` and `a.negate()` together cover every cell exactly once.
    pub fn negate(&self) -> Self {
        let inner = Arc::clone(&self.0);
        Self::new(move |t, c| !inner(t, c))
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
