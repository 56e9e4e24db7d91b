//! The plan tree: [`Extent`], [`TileNode`] and [`Plan`].

use std::convert::Infallible;
use std::fmt;

use trapeze_core::{Domain, Interval, Slopes, StencilError};

// ── Extents ────────────────────────────────────────────────────────

/// The footprint of a tile along one dimension.
///
/// At timestep `t` of a tile starting at `t0`, the extent covers
/// `[lo + dlo·(t - t0), hi + dhi·(t - t0))`. Coordinates may leave the
/// domain; executors wrap them back in modulo the domain width.
///
/// A `circular` extent still spans the whole wrap-around domain. It has
/// no edges, so cutting it places the seam piece across the wrap point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Lower bound at `t0`.
    pub lo: i64,
    /// Upper bound (exclusive) at `t0`.
    pub hi: i64,
    /// Lower-edge slope, cells per timestep.
    pub dlo: i64,
    /// Upper-edge slope, cells per timestep.
    pub dhi: i64,
    /// Whether the extent spans the full periodic domain.
    pub circular: bool,
}

impl Extent {
    /// A straight-edged extent over `[lo, hi)`.
    pub fn rect(lo: i64, hi: i64) -> Self {
        Self {
            lo,
            hi,
            dlo: 0,
            dhi: 0,
            circular: false,
        }
    }

    /// Bounds `[lo, hi)` `s` timesteps after the tile's start.
    pub fn at(&self, s: i64) -> (i64, i64) {
        (self.lo + self.dlo * s, self.hi + self.dhi * s)
    }

    /// Number of cells covered `s` timesteps after the tile's start.
    pub fn width_at(&self, s: i64) -> i64 {
        let (lo, hi) = self.at(s);
        (hi - lo).max(0)
    }

    /// The extent a tile starting `s` timesteps later begins with.
    pub fn advance(&self, s: i64) -> Self {
        let (lo, hi) = self.at(s);
        Self { lo, hi, ..*self }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}{:+}, {}{:+})", self.lo, self.dlo, self.hi, self.dhi)?;
        if self.circular {
            write!(f, "@")?;
        }
        Ok(())
    }
}

// ── Tile nodes ─────────────────────────────────────────────────────

/// What a [`TileNode`] does with its region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Sweep the region directly.
    Leaf,
    /// Run the children one after another, earliest first.
    TimeSplit,
    /// Run the children wave by wave; members of a wave are independent.
    SpaceSplit {
        /// The cut dimension.
        dim: usize,
    },
}

/// One tile of a plan, covering timesteps `[t0, t1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileNode {
    /// Node kind.
    pub kind: NodeKind,
    /// Wave index within the parent. Always 0 for the root.
    pub wave: u8,
    /// First timestep (inclusive).
    pub t0: i64,
    /// Last timestep (exclusive).
    pub t1: i64,
    /// Per-dimension footprint.
    pub extents: Vec<Extent>,
    /// Sub-tiles. Empty for leaves.
    pub children: Vec<TileNode>,
}

impl TileNode {
    /// Whether the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Number of timesteps spanned.
    pub fn duration(&self) -> i64 {
        self.t1 - self.t0
    }

    /// Cells × timesteps covered by the tile.
    pub fn volume(&self) -> u64 {
        tile_volume(&self.extents, self.duration())
    }

    /// Per-dimension bounds at timestep `t`.
    pub fn bounds_at(&self, t: i64) -> Vec<(i64, i64)> {
        self.extents.iter().map(|e| e.at(t - self.t0)).collect()
    }

    /// Children grouped by wave, waves in ascending order.
    ///
    /// Each wave keeps its members in tree order.
    pub fn waves(&self) -> Vec<Vec<&TileNode>> {
        let mut waves: Vec<Vec<&TileNode>> = Vec::new();
        for child in &self.children {
            let w = child.wave as usize;
            if waves.len() <= w {
                waves.resize_with(w + 1, Vec::new);
            }
            waves[w].push(child);
        }
        waves.retain(|w| !w.is_empty());
        waves
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a TileNode, usize), depth: usize) {
        f(self, depth);
        for child in &self.children {
            child.visit(f, depth + 1);
        }
    }

    fn check_tiling(&self, intervals: &[Interval]) -> Result<(), StencilError> {
        if self.t0 >= self.t1 {
            return Err(corrupt(format!("node spans empty [{}, {})", self.t0, self.t1)));
        }
        if self.extents.len() != intervals.len() {
            return Err(corrupt(format!(
                "node has {} extents for a rank-{} domain",
                self.extents.len(),
                intervals.len()
            )));
        }
        match self.kind {
            NodeKind::Leaf if !self.children.is_empty() => {
                return Err(corrupt(format!("leaf has {} children", self.children.len())))
            }
            NodeKind::Leaf => return Ok(()),
            NodeKind::TimeSplit => self.check_time_split()?,
            NodeKind::SpaceSplit { dim } => self.check_space_split(dim, intervals)?,
        }
        self.children
            .iter()
            .try_for_each(|child| child.check_tiling(intervals))
    }

    /// Children must continue the parent's footprint in time order, and
    /// any timestep no child covers must hold no cells.
    fn check_time_split(&self) -> Result<(), StencilError> {
        let mut t = self.t0;
        for child in &self.children {
            if child.t0 < t || child.t1 > self.t1 {
                return Err(corrupt(format!(
                    "time split child [{}, {}) overlaps a sibling or leaves [{}, {})",
                    child.t0, child.t1, self.t0, self.t1
                )));
            }
            self.check_empty_span(t, child.t0)?;
            let shift = child.t0 - self.t0;
            for (dim, (c, p)) in child.extents.iter().zip(&self.extents).enumerate() {
                let (lo, hi) = checked_at(p, shift)?;
                if *c != (Extent { lo, hi, ..*p }) {
                    return Err(corrupt(format!(
                        "time split child at t={} has extent {c} in dimension {dim}, \
                         expected {p} advanced by {shift}",
                        child.t0
                    )));
                }
            }
            t = child.t1;
        }
        self.check_empty_span(t, self.t1)
    }

    fn check_empty_span(&self, from: i64, to: i64) -> Result<(), StencilError> {
        for t in from..to {
            if self.holds_cells_at(t - self.t0, None)? {
                return Err(corrupt(format!("time split leaves timestep {t} uncovered")));
            }
        }
        Ok(())
    }

    /// Whether every dimension except `skip` is non-empty `s` steps in.
    fn holds_cells_at(&self, s: i64, skip: Option<usize>) -> Result<bool, StencilError> {
        for (dim, e) in self.extents.iter().enumerate() {
            if Some(dim) == skip {
                continue;
            }
            let (lo, hi) = checked_at(e, s)?;
            if lo >= hi {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Children must match the parent outside the cut dimension and their
    /// rows along it must partition the parent's row at every timestep
    /// where the parent holds cells. A circular row is partitioned once
    /// the pieces chain through exactly one domain width.
    fn check_space_split(&self, dim: usize, intervals: &[Interval]) -> Result<(), StencilError> {
        let Some(iv) = intervals.get(dim) else {
            return Err(corrupt(format!(
                "space split cuts dimension {dim} of a rank-{} domain",
                intervals.len()
            )));
        };
        for child in &self.children {
            if (child.t0, child.t1) != (self.t0, self.t1) {
                return Err(corrupt(format!(
                    "space split child spans [{}, {}), parent [{}, {})",
                    child.t0, child.t1, self.t0, self.t1
                )));
            }
            let moved = child
                .extents
                .iter()
                .zip(&self.extents)
                .enumerate()
                .any(|(d, (c, p))| d != dim && c != p);
            if moved || child.extents.len() != self.extents.len() {
                return Err(corrupt(format!(
                    "space split child changes a dimension other than the cut {dim}"
                )));
            }
        }

        let parent = &self.extents[dim];
        let mut rows = Vec::with_capacity(self.children.len());
        for s in 0..self.duration() {
            if !self.holds_cells_at(s, Some(dim))? {
                continue;
            }
            let t = self.t0 + s;
            let (plo, phi) = checked_at(parent, s)?;
            rows.clear();
            for child in &self.children {
                let (lo, hi) = checked_at(&child.extents[dim], s)?;
                if lo < hi {
                    rows.push((lo, hi));
                }
            }
            rows.sort_unstable();
            if rows.windows(2).any(|w| w[0].1 != w[1].0) {
                return Err(corrupt(format!(
                    "pieces of the cut in dimension {dim} overlap or leave a gap at timestep {t}"
                )));
            }
            let covered = rows.first().zip(rows.last()).map(|(f, l)| (f.0, l.1));
            let exact = match covered {
                Some((lo, hi)) if parent.circular => {
                    let ring = Some(iv.width());
                    (plo..phi).contains(&lo)
                        && hi.checked_sub(lo) == ring
                        && phi.checked_sub(plo) == ring
                }
                Some(span) => span == (plo, phi),
                None => plo >= phi,
            };
            if !exact {
                return Err(corrupt(format!(
                    "pieces of the cut in dimension {dim} do not partition {parent} at timestep {t}"
                )));
            }
        }
        Ok(())
    }

    fn parallel_width(&self) -> usize {
        match self.kind {
            NodeKind::Leaf => 1,
            NodeKind::TimeSplit => self
                .children
                .iter()
                .map(TileNode::parallel_width)
                .max()
                .unwrap_or(0),
            NodeKind::SpaceSplit { .. } => self
                .waves()
                .iter()
                .map(|w| w.iter().map(|c| c.parallel_width()).sum())
                .max()
                .unwrap_or(0),
        }
    }
}

/// [`Extent::at`] without overflow, for trees read from untrusted bytes.
fn checked_at(e: &Extent, s: i64) -> Result<(i64, i64), StencilError> {
    let at = |base: i64, slope: i64| slope.checked_mul(s).and_then(|d| base.checked_add(d));
    match (at(e.lo, e.dlo), at(e.hi, e.dhi)) {
        (Some(lo), Some(hi)) => Ok((lo, hi)),
        _ => Err(corrupt(format!("extent {e} overflows {s} timesteps in"))),
    }
}

/// Cells × timesteps of a footprint over `duration` timesteps.
pub(crate) fn tile_volume(extents: &[Extent], duration: i64) -> u64 {
    (0..duration.max(0))
        .map(|s| {
            extents
                .iter()
                .map(|e| e.width_at(s) as u64)
                .fold(1u64, u64::saturating_mul)
        })
        .fold(0u64, u64::saturating_add)
}

// ── Plan ───────────────────────────────────────────────────────────

/// An immutable decomposition of `domain × [1, T + 1)`.
///
/// Produced by [`PlanGenerator`](crate::PlanGenerator) or loaded by
/// [`PlanStore`](crate::PlanStore). A plan is only valid for the domain,
/// timestep count and slopes it records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    domain: Domain,
    timesteps: u64,
    slopes: Slopes,
    root: TileNode,
}

impl Plan {
    pub(crate) fn from_parts(
        domain: Domain,
        timesteps: u64,
        slopes: Slopes,
        root: TileNode,
    ) -> Self {
        Self {
            domain,
            timesteps,
            slopes,
            root,
        }
    }

    /// The domain the plan covers.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of timesteps the plan computes.
    pub fn timesteps(&self) -> u64 {
        self.timesteps
    }

    /// Dependency slopes the plan was generated for.
    pub fn slopes(&self) -> &Slopes {
        &self.slopes
    }

    /// The root tile.
    pub fn root(&self) -> &TileNode {
        &self.root
    }

    /// Whether any dimension of the root wraps around the domain.
    pub fn is_circular(&self) -> bool {
        self.root.extents.iter().any(|e| e.circular)
    }

    /// Number of leaf tiles.
    pub fn leaf_count(&self) -> usize {
        let mut n = 0;
        self.root.visit(&mut |node, _| n += usize::from(node.is_leaf()), 0);
        n
    }

    /// Total number of tiles.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.root.visit(&mut |_, _| n += 1, 0);
        n
    }

    /// Length of the longest root-to-leaf path, counting the root as 1.
    pub fn depth(&self) -> usize {
        let mut d = 0;
        self.root.visit(&mut |_, depth| d = d.max(depth + 1), 0);
        d
    }

    /// Largest number of leaves that may run at the same time.
    pub fn max_parallel_width(&self) -> usize {
        self.root.parallel_width()
    }

    /// Leaves in execution order (waves flattened in tree order).
    pub fn leaves(&self) -> Vec<&TileNode> {
        let mut out = Vec::new();
        self.root.visit(
            &mut |node, _| {
                if node.is_leaf() {
                    out.push(node);
                }
            },
            0,
        );
        out
    }

    /// Check, split by split, that the tree tiles `domain × [1, T + 1)`.
    ///
    /// The root must be the domain rectangle, circular only along
    /// dimensions with a non-zero slope. Time splits must stack their
    /// parent's footprint without a gap that holds cells, and the pieces
    /// of every space split must partition the parent along the cut at
    /// each timestep. Runs in `O(nodes × duration)`, so every loaded plan
    /// goes through it; [`validate_coverage`](Self::validate_coverage) is
    /// the exhaustive per-cell check.
    pub fn validate_tiling(&self) -> Result<(), StencilError> {
        let root = &self.root;
        let end = i64::try_from(self.timesteps)
            .ok()
            .and_then(|t| t.checked_add(1));
        if end != Some(root.t1) || root.t0 != 1 {
            return Err(corrupt(format!(
                "root spans [{}, {}), expected [1, {})",
                root.t0,
                root.t1,
                self.timesteps.saturating_add(1)
            )));
        }
        let intervals = self.domain.intervals();
        let slopes = self.slopes.as_slice();
        if root.extents.len() != intervals.len() || slopes.len() != intervals.len() {
            return Err(corrupt(format!(
                "root has {} extents and {} slopes for a rank-{} domain",
                root.extents.len(),
                slopes.len(),
                intervals.len()
            )));
        }
        let per_dim = root.extents.iter().zip(intervals).zip(slopes);
        for (dim, ((e, iv), &slope)) in per_dim.enumerate() {
            let expected = Extent {
                circular: e.circular,
                ..Extent::rect(iv.lo(), iv.hi())
            };
            if *e != expected {
                return Err(corrupt(format!(
                    "root extent {e} in dimension {dim} is not the domain {iv}"
                )));
            }
            if e.circular && slope == 0 {
                return Err(corrupt(format!(
                    "root dimension {dim} is circular with slope 0"
                )));
            }
        }
        root.check_tiling(intervals)
    }

    /// Check that the leaves cover every `(t, cell)` of the plan exactly
    /// once, with coordinates wrapped into the domain.
    ///
    /// Costs `O(T × cells)` memory; meant for tests and diagnostics.
    pub fn validate_coverage(&self) -> Result<(), StencilError> {
        let intervals = self.domain.intervals();
        let cells = self.domain.cell_count() as usize;
        let steps = self.timesteps as usize;
        let mut counts = vec![0u32; cells * steps];

        for leaf in self.leaves() {
            if leaf.t0 < 1 || leaf.t1 > self.timesteps as i64 + 1 {
                return Err(corrupt(format!(
                    "leaf spans [{}, {}), outside [1, {})",
                    leaf.t0,
                    leaf.t1,
                    self.timesteps + 1
                )));
            }
            for t in leaf.t0..leaf.t1 {
                let bounds = leaf.bounds_at(t);
                let base = (t - 1) as usize * cells;
                for_each_cell(&bounds, &mut |coord| {
                    let mut idx = 0usize;
                    for (iv, &x) in intervals.iter().zip(coord) {
                        let local = (iv.wrap(x) - iv.lo()) as usize;
                        idx = idx * iv.width() as usize + local;
                    }
                    counts[base + idx] += 1;
                });
            }
        }

        match counts.iter().position(|&c| c != 1) {
            None => Ok(()),
            Some(pos) => Err(corrupt(format!(
                "timestep {} cell #{} covered {} times",
                pos / cells + 1,
                pos % cells,
                counts[pos]
            ))),
        }
    }
}

fn corrupt(detail: String) -> StencilError {
    StencilError::PlanCorrupt { detail }
}

/// Call `f` for every coordinate of a box, row-major.
pub fn for_each_cell(bounds: &[(i64, i64)], f: &mut impl FnMut(&[i64])) {
    let _ = try_for_each_cell(bounds, &mut |c| {
        f(c);
        Ok::<(), Infallible>(())
    });
}

/// Call `f` for every coordinate of a box, row-major, stopping at the
/// first error.
///
/// Empty boxes (any `lo >= hi`) visit nothing.
pub fn try_for_each_cell<E>(
    bounds: &[(i64, i64)],
    f: &mut impl FnMut(&[i64]) -> Result<(), E>,
) -> Result<(), E> {
    if bounds.iter().any(|&(lo, hi)| lo >= hi) {
        return Ok(());
    }
    let mut coord: Vec<i64> = bounds.iter().map(|&(lo, _)| lo).collect();
    loop {
        f(&coord)?;
        let mut dim = coord.len();
        loop {
            if dim == 0 {
                return Ok(());
            }
            dim -= 1;
            coord[dim] += 1;
            if coord[dim] < bounds[dim].1 {
                break;
            }
            coord[dim] = bounds[dim].0;
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plan over {} for {} timesteps (slopes {}, {} nodes, {} leaves, depth {})",
            self.domain,
            self.timesteps,
            self.slopes,
            self.node_count(),
            self.leaf_count(),
            self.depth()
        )
    }
}
