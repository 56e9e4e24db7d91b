//! The plan executor: walks a plan tree and applies kernels.
//!
//! # Execution order
//!
//! - `TimeSplit` children run strictly in order.
//! - `SpaceSplit` children run wave by wave. Members of one wave are
//!   forked with `rayon::join`; the join is the barrier before the next
//!   wave.
//! - A `Leaf` sweeps `t0..t1`, each timestep in row-major order, with
//!   coordinates wrapped into the domain.
//!
//! The first failing leaf sets an abort flag. Leaves that have not
//! started yet see it and return without touching the array, and the
//! error travels up the joins to the caller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tracing::{debug, warn};
use trapeze_array::Array;
use trapeze_core::{ConfigError, Element, Interval, StencilError};
use trapeze_kernel::GuardedKernelSet;
use trapeze_plan::plan::try_for_each_cell;
use trapeze_plan::{NodeKind, Plan, TileNode};

use crate::config::ExecutorConfig;
use crate::metrics::RunMetrics;

/// Runs plans against arrays with one kernel set.
///
/// # Examples
///
/// ```
/// use trapeze_array::{Array, ArrayConfig, BoundaryPolicy};
/// use trapeze_core::Shape;
/// use trapeze_engine::{ExecutorConfig, PlanExecutor};
/// use trapeze_kernel::{Guard, GuardedKernelSet, Kernel};
/// use trapeze_plan::PlanGenerator;
///
/// let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 0], [-1, 1]]).unwrap();
/// let mut kernels = GuardedKernelSet::<f64>::new(1);
/// kernels
///     .register("avg", Guard::always(), vec![Kernel::<f64>::new(shape, |ctx| {
///         Ok((ctx.at(-1, &[-1])? + ctx.at(-1, &[0])? + ctx.at(-1, &[1])?) / 3.0)
///     })])
///     .unwrap();
///
/// let config = ArrayConfig::new(vec![100]).boundary(BoundaryPolicy::Periodic);
/// let mut array = Array::new(config, kernels.ring_depth()).unwrap();
/// array.fill_with(0, |c| c[0] as f64);
///
/// let plan = PlanGenerator::default()
///     .generate(array.domain(), &kernels.slopes(), true, 10)
///     .unwrap();
/// let exec = PlanExecutor::new(&kernels, ExecutorConfig::default()).unwrap();
/// let metrics = exec.run(&plan, &mut array).unwrap();
/// assert_eq!(metrics.cells, 100 * 10);
/// ```
pub struct PlanExecutor<'k, T> {
    kernels: &'k GuardedKernelSet<T>,
    config: ExecutorConfig,
    pool: Option<rayon::ThreadPool>,
}

impl<'k, T: Element> PlanExecutor<'k, T> {
    /// Create an executor, building a dedicated pool if one is requested.
    pub fn new(
        kernels: &'k GuardedKernelSet<T>,
        config: ExecutorConfig,
    ) -> Result<Self, StencilError> {
        config.validate()?;
        let pool = match config.resolved_threads() {
            Some(n) if config.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("trapeze-worker-{i}"))
                    .build()
                    .map_err(|e| ConfigError::ThreadPoolFailed {
                        reason: e.to_string(),
                    })?,
            ),
            _ => None,
        };
        Ok(Self {
            kernels,
            config,
            pool,
        })
    }

    /// The executor's configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `plan` over `array`, computing timesteps `1..=plan.timesteps()`.
    ///
    /// Returns `PlanMismatch` without touching the array if the plan does
    /// not fit the array or the kernel set.
    pub fn run(&self, plan: &Plan, array: &mut Array<T>) -> Result<RunMetrics, StencilError> {
        self.preflight(plan, array)?;
        self.execute(plan, array)
    }

    /// Like [`run`](Self::run), additionally checking that the caller asked
    /// for exactly the number of timesteps the plan was generated for.
    pub fn run_steps(
        &self,
        plan: &Plan,
        array: &mut Array<T>,
        timesteps: u64,
    ) -> Result<RunMetrics, StencilError> {
        if timesteps != plan.timesteps() {
            return Err(mismatch(format!(
                "plan computes {} timesteps, {timesteps} requested",
                plan.timesteps()
            )));
        }
        self.run(plan, array)
    }

    fn preflight(&self, plan: &Plan, array: &Array<T>) -> Result<(), StencilError> {
        if array.domain() != plan.domain() {
            return Err(mismatch(format!(
                "array domain {} differs from plan domain {}",
                array.domain(),
                plan.domain()
            )));
        }
        if self.kernels.rank() != plan.domain().rank() {
            return Err(mismatch(format!(
                "kernel set has rank {}, plan has rank {}",
                self.kernels.rank(),
                plan.domain().rank()
            )));
        }
        let slopes = self.kernels.slopes();
        if !slopes.covered_by(plan.slopes()) {
            return Err(mismatch(format!(
                "kernel slopes {slopes} exceed plan slopes {}",
                plan.slopes()
            )));
        }
        let needed = Array::<T>::ring_for(self.kernels.ring_depth());
        if array.ring_depth() < needed {
            return Err(mismatch(format!(
                "array keeps {} time slices, kernels need {needed}",
                array.ring_depth()
            )));
        }
        if array.boundary().wraps() {
            let linear = plan
                .root()
                .extents
                .iter()
                .zip(plan.slopes().as_slice())
                .position(|(e, &s)| s > 0 && !e.circular);
            if let Some(dim) = linear {
                return Err(mismatch(format!(
                    "array boundary '{}' wraps but the plan treats dimension {dim} as non-periodic",
                    array.boundary().name()
                )));
            }
        }
        Ok(())
    }

    fn execute(&self, plan: &Plan, array: &Array<T>) -> Result<RunMetrics, StencilError> {
        let start = Instant::now();
        debug!(
            domain = %plan.domain(),
            timesteps = plan.timesteps(),
            leaves = plan.leaf_count(),
            parallel = self.config.parallel,
            "plan run started"
        );

        let run = Run {
            kernels: self.kernels,
            array,
            intervals: plan.domain().intervals(),
            parallel: self.config.parallel,
            abort: AtomicBool::new(false),
            leaves: AtomicU64::new(0),
            cells: AtomicU64::new(0),
        };
        let result = match &self.pool {
            Some(pool) => pool.install(|| run.node(plan.root())),
            None => run.node(plan.root()),
        };

        let metrics = RunMetrics {
            total_us: start.elapsed().as_micros() as u64,
            leaves: run.leaves.load(Ordering::Relaxed),
            cells: run.cells.load(Ordering::Relaxed),
            timesteps: plan.timesteps(),
        };
        match result {
            Ok(()) => {
                debug!(
                    total_us = metrics.total_us,
                    leaves = metrics.leaves,
                    cells = metrics.cells,
                    "plan run finished"
                );
                Ok(metrics)
            }
            Err(e) => {
                warn!(error = %e, leaves_done = metrics.leaves, "plan run aborted");
                Err(e)
            }
        }
    }
}

fn mismatch(reason: String) -> StencilError {
    StencilError::PlanMismatch { reason }
}

// ── Run state ──────────────────────────────────────────────────────

/// State shared by every task of one run.
struct Run<'r, T> {
    kernels: &'r GuardedKernelSet<T>,
    array: &'r Array<T>,
    intervals: &'r [Interval],
    parallel: bool,
    abort: AtomicBool,
    leaves: AtomicU64,
    cells: AtomicU64,
}

impl<T: Element> Run<'_, T> {
    fn node(&self, node: &TileNode) -> Result<(), StencilError> {
        if self.abort.load(Ordering::Relaxed) {
            return Ok(());
        }
        match node.kind {
            NodeKind::Leaf => self.leaf(node).inspect_err(|_| {
                self.abort.store(true, Ordering::Relaxed);
            }),
            NodeKind::TimeSplit => node.children.iter().try_for_each(|c| self.node(c)),
            NodeKind::SpaceSplit { .. } => node
                .waves()
                .iter()
                .try_for_each(|wave| self.wave(wave)),
        }
    }

    fn wave(&self, members: &[&TileNode]) -> Result<(), StencilError> {
        match members {
            [] => Ok(()),
            [one] => self.node(one),
            _ if !self.parallel => members.iter().try_for_each(|m| self.node(m)),
            _ => {
                let (left, right) = members.split_at(members.len() / 2);
                let (a, b) = rayon::join(|| self.wave(left), || self.wave(right));
                a.and(b)
            }
        }
    }

    fn leaf(&self, leaf: &TileNode) -> Result<(), StencilError> {
        let mut wrapped = vec![0i64; self.intervals.len()];
        let mut cells = 0u64;
        for t in leaf.t0..leaf.t1 {
            if self.abort.load(Ordering::Relaxed) {
                break;
            }
            try_for_each_cell(&leaf.bounds_at(t), &mut |coord| {
                for ((w, &x), iv) in wrapped.iter_mut().zip(coord).zip(self.intervals) {
                    *w = iv.wrap(x);
                }
                cells += 1;
                self.kernels.apply(t, &wrapped, self.array)
            })?;
        }
        self.leaves.fetch_add(1, Ordering::Relaxed);
        self.cells.fetch_add(cells, Ordering::Relaxed);
        Ok(())
    }
}
