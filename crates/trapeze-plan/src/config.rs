//! Plan generation parameters.

use trapeze_core::ConfigError;

// ── GeneratorConfig ────────────────────────────────────────────────

/// Tuning knobs for [`PlanGenerator`](crate::PlanGenerator).
///
/// Neither knob affects results, only how the work is tiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Tiles of at most this many cells × timesteps become leaves.
    /// Default: 4096.
    pub leaf_volume: u64,
    /// Dimensions narrower than this are never space-cut. Default: 2.
    pub min_cut_width: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            leaf_volume: 4096,
            min_cut_width: 2,
        }
    }
}

impl GeneratorConfig {
    /// Check the knobs for values that cannot produce a plan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leaf_volume == 0 {
            return Err(ConfigError::LeafVolumeZero);
        }
        if self.min_cut_width < 2 {
            return Err(ConfigError::CutWidthTooSmall {
                configured: self.min_cut_width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_leaf_volume_rejected() {
        let cfg = GeneratorConfig {
            leaf_volume: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::LeafVolumeZero));
    }

    #[test]
    fn narrow_cut_width_rejected() {
        let cfg = GeneratorConfig {
            min_cut_width: 1,
            ..Default::default()
        };
        match cfg.validate() {
            Err(ConfigError::CutWidthTooSmall { configured: 1 }) => {}
            other => panic!("expected CutWidthTooSmall, got {other:?}"),
        }
    }
}
