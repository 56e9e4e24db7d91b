//! Trapezoidal decomposition of a space-time domain.
//!
//! [`PlanGenerator`] recursively cuts `domain × [1, T + 1)` into tiles
//! whose edges lean by the dependency slope `σ` of each dimension:
//!
//! ```text
//!   space cut (linear)              space cut (circular)
//!
//!  t1 ┌──╲      ╱──┐               t1 ──╲        ╱──
//!     │ L ╲ M  ╱ R │                 V  ╲  U   ╱  V
//!  t0 │────╲  ╱────│               t0 ───╲────╱───
//!     lo    m      hi                lo          hi
//! ```
//!
//! Leaning edges keep every cell a tile reads inside the tile itself or
//! inside a tile that finished earlier, so `L` and `R` run concurrently
//! and `M` runs after both. A circular dimension has no edge yet; its
//! first cut puts `U` over the domain and `V` across the wrap seam.
//! When no space cut is legal the tile is halved in time.

use trapeze_core::{Domain, Slopes, StencilError};
use tracing::{debug, trace};

use crate::config::GeneratorConfig;
use crate::plan::{tile_volume, Extent, NodeKind, Plan, TileNode};

/// A candidate space cut: the dimension, its width and the pieces.
struct Cut {
    dim: usize,
    width: i64,
    pieces: Vec<(u8, Extent)>,
}

/// Builds [`Plan`]s. Deterministic: equal inputs give equal plans.
///
/// # Examples
///
/// ```
/// use trapeze_core::{Domain, Slopes};
/// use trapeze_plan::{GeneratorConfig, PlanGenerator};
///
/// let gen = PlanGenerator::new(GeneratorConfig::default()).unwrap();
/// let domain = Domain::from_sizes(&[256]).unwrap();
/// let plan = gen.generate(&domain, &Slopes::from_vec(vec![1]), true, 64).unwrap();
/// assert_eq!(plan.timesteps(), 64);
/// assert!(plan.leaf_count() > 1);
/// plan.validate_coverage().unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct PlanGenerator {
    config: GeneratorConfig,
}

impl PlanGenerator {
    /// Create a generator, validating `config`.
    pub fn new(config: GeneratorConfig) -> Result<Self, StencilError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The generator's configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Decompose `domain × [1, timesteps + 1)`.
    ///
    /// `wraps` marks the domain as periodic: every dimension with a
    /// non-zero slope starts out circular.
    pub fn generate(
        &self,
        domain: &Domain,
        slopes: &Slopes,
        wraps: bool,
        timesteps: u64,
    ) -> Result<Plan, StencilError> {
        if timesteps == 0 || timesteps >= i64::MAX as u64 {
            return Err(StencilError::InvalidTimestepCount {
                requested: timesteps,
            });
        }
        if slopes.rank() != domain.rank() {
            return Err(StencilError::InvalidDomain {
                reason: format!(
                    "domain has rank {} but slopes have rank {}",
                    domain.rank(),
                    slopes.rank()
                ),
            });
        }
        let sigma = slopes
            .as_slice()
            .iter()
            .map(|&s| {
                i64::try_from(s).map_err(|_| StencilError::InvalidShape {
                    reason: format!("slope {s} is out of range"),
                })
            })
            .collect::<Result<Vec<i64>, _>>()?;

        let extents = domain
            .intervals()
            .iter()
            .zip(&sigma)
            .map(|(iv, &s)| Extent {
                circular: wraps && s > 0,
                ..Extent::rect(iv.lo(), iv.hi())
            })
            .collect();

        let root = self.decompose(0, 1, timesteps as i64 + 1, extents, &sigma);
        let plan = Plan::from_parts(domain.clone(), timesteps, slopes.clone(), root);
        debug!(
            domain = %domain,
            timesteps,
            slopes = %slopes,
            nodes = plan.node_count(),
            leaves = plan.leaf_count(),
            depth = plan.depth(),
            "generated plan"
        );
        Ok(plan)
    }

    fn decompose(
        &self,
        wave: u8,
        t0: i64,
        t1: i64,
        extents: Vec<Extent>,
        sigma: &[i64],
    ) -> TileNode {
        let dt = t1 - t0;
        let mut node = TileNode {
            kind: NodeKind::Leaf,
            wave,
            t0,
            t1,
            extents,
            children: Vec::new(),
        };
        if tile_volume(&node.extents, dt) <= self.config.leaf_volume {
            return node;
        }

        if let Some(cut) = self.best_space_cut(&node.extents, dt, sigma) {
            trace!(
                t0,
                t1,
                dim = cut.dim,
                width = cut.width,
                pieces = cut.pieces.len(),
                "space cut"
            );
            node.kind = NodeKind::SpaceSplit { dim: cut.dim };
            node.children = cut
                .pieces
                .into_iter()
                .map(|(w, piece)| {
                    let mut ex = node.extents.clone();
                    ex[cut.dim] = piece;
                    (w, ex)
                })
                .filter(|(_, ex)| tile_volume(ex, dt) > 0)
                .map(|(w, ex)| self.decompose(w, t0, t1, ex, sigma))
                .collect();
            return node;
        }

        if dt > 1 {
            let h = dt / 2;
            trace!(t0, t1, at = t0 + h, "time cut");
            let top: Vec<Extent> = node.extents.iter().map(|e| e.advance(h)).collect();
            node.kind = NodeKind::TimeSplit;
            node.children = [(0, t0, t0 + h, node.extents.clone()), (1, t0 + h, t1, top)]
                .into_iter()
                .filter(|(_, a, b, ex)| tile_volume(ex, b - a) > 0)
                .map(|(w, a, b, ex)| self.decompose(w, a, b, ex, sigma))
                .collect();
        }
        node
    }

    /// Widest legal space cut, ties going to the lowest dimension.
    fn best_space_cut(&self, extents: &[Extent], dt: i64, sigma: &[i64]) -> Option<Cut> {
        let mut best: Option<Cut> = None;
        for dim in 0..extents.len() {
            if let Some(cut) = self.space_cut(extents, dim, dt, sigma[dim]) {
                if best.as_ref().is_none_or(|b| cut.width > b.width) {
                    best = Some(cut);
                }
            }
        }
        best
    }

    fn space_cut(&self, extents: &[Extent], dim: usize, dt: i64, sigma: i64) -> Option<Cut> {
        let e = extents[dim];
        let width = e.width_at(0).max(e.width_at(dt - 1));
        if width < self.config.min_cut_width {
            return None;
        }

        if e.circular {
            if width < 2 * sigma * dt {
                return None;
            }
            let upright = Extent {
                lo: e.lo,
                hi: e.hi,
                dlo: sigma,
                dhi: -sigma,
                circular: false,
            };
            let seam = Extent {
                lo: e.hi,
                hi: e.hi,
                dlo: -sigma,
                dhi: sigma,
                circular: false,
            };
            return Some(Cut {
                dim,
                width,
                pieces: vec![(0, upright), (1, seam)],
            });
        }

        let a = e.lo + (sigma + e.dlo) * dt;
        let b = e.hi - (sigma - e.dhi) * dt;
        if a > b {
            return None;
        }
        let m = (a + b).div_euclid(2);
        let left = Extent {
            hi: m,
            dhi: -sigma,
            ..e
        };
        let right = Extent {
            lo: m,
            dlo: sigma,
            ..e
        };
        let side_volume = |piece: Extent| {
            let mut ex = extents.to_vec();
            ex[dim] = piece;
            tile_volume(&ex, dt)
        };
        if side_volume(left) == 0 || side_volume(right) == 0 {
            return None;
        }

        let mut pieces = vec![(0, left), (0, right)];
        if sigma > 0 {
            pieces.push((
                1,
                Extent {
                    lo: m,
                    hi: m,
                    dlo: -sigma,
                    dhi: sigma,
                    circular: false,
                },
            ));
        }
        Some(Cut { dim, width, pieces })
    }
}
