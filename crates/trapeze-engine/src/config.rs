//! Executor configuration.

use trapeze_core::ConfigError;

// ── ExecutorConfig ─────────────────────────────────────────────────

/// Configuration for [`PlanExecutor`](crate::PlanExecutor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Fork independent tiles onto worker threads. When `false`, every
    /// tile runs on the calling thread in plan order. Default: `true`.
    pub parallel: bool,
    /// Worker thread count. `None` uses rayon's global pool; `Some(n)`
    /// builds a dedicated pool. Default: `None`.
    pub threads: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

impl ExecutorConfig {
    /// Sequential execution on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            threads: None,
        }
    }

    /// Check for values that cannot build an executor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ThreadCountZero);
        }
        Ok(())
    }

    /// Size of the dedicated pool, if one is requested.
    ///
    /// Explicit values are clamped to `[1, 256]`.
    pub fn resolved_threads(&self) -> Option<usize> {
        self.threads.map(|n| n.clamp(1, 256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_parallel_on_global_pool() {
        let cfg = ExecutorConfig::default();
        assert!(cfg.parallel);
        assert_eq!(cfg.resolved_threads(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_threads_rejected() {
        let cfg = ExecutorConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ThreadCountZero));
    }

    #[test]
    fn thread_count_clamped() {
        let cfg = ExecutorConfig {
            threads: Some(10_000),
            ..Default::default()
        };
        assert_eq!(cfg.resolved_threads(), Some(256));
    }
}
