//! [`Stencil`]: one object for the generate → store → load → run cycle.

use std::io::{Read, Write};

use trapeze_array::{Array, ArrayConfig, BoundaryPolicy};
use trapeze_core::{Domain, Element, StencilError};
use trapeze_kernel::GuardedKernelSet;
use trapeze_plan::{GeneratorConfig, Plan, PlanGenerator, PlanStore};

use crate::config::ExecutorConfig;
use crate::executor::PlanExecutor;
use crate::metrics::RunMetrics;

/// A kernel set bundled with plan generation and execution settings.
///
/// # Examples
///
/// ```
/// use trapeze_array::{ArrayConfig, BoundaryPolicy};
/// use trapeze_core::Shape;
/// use trapeze_engine::Stencil;
/// use trapeze_kernel::{Guard, GuardedKernelSet, Kernel};
///
/// let shape = Shape::from_rows(&[[0, 0], [-1, -1], [-1, 1]]).unwrap();
/// let mut kernels = GuardedKernelSet::<f64>::new(1);
/// kernels
///     .register("avg", Guard::always(), vec![Kernel::<f64>::new(shape, |ctx| {
///         Ok(0.5 * (ctx.at(-1, &[-1])? + ctx.at(-1, &[1])?))
///     })])
///     .unwrap();
/// let stencil = Stencil::new(kernels);
///
/// let mut a = stencil
///     .array_with(ArrayConfig::new(vec![64]).boundary(BoundaryPolicy::Periodic))
///     .unwrap();
/// a.fill_with(0, |c| if c[0] == 0 { 1.0 } else { 0.0 });
///
/// let plan = stencil.gen_plan(a.domain(), a.boundary(), 16).unwrap();
/// let mut bytes = Vec::new();
/// stencil.store_plan(&plan, &mut bytes).unwrap();
/// let plan = stencil.load_plan(bytes.as_slice()).unwrap();
/// stencil.run_plan_steps(&plan, &mut a, 16).unwrap();
///
/// let total: f64 = a.slice(16).iter().sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Stencil<T> {
    kernels: GuardedKernelSet<T>,
    generator: PlanGenerator,
    executor: ExecutorConfig,
}

impl<T: Element> Stencil<T> {
    /// Wrap a kernel set with default generator and executor settings.
    pub fn new(kernels: GuardedKernelSet<T>) -> Self {
        Self {
            kernels,
            generator: PlanGenerator::default(),
            executor: ExecutorConfig::default(),
        }
    }

    /// Replace the plan generator settings.
    pub fn with_generator(mut self, config: GeneratorConfig) -> Result<Self, StencilError> {
        self.generator = PlanGenerator::new(config)?;
        Ok(self)
    }

    /// Replace the executor settings.
    pub fn with_executor(mut self, config: ExecutorConfig) -> Result<Self, StencilError> {
        config.validate()?;
        self.executor = config;
        Ok(self)
    }

    /// The kernel set.
    pub fn kernels(&self) -> &GuardedKernelSet<T> {
        &self.kernels
    }

    /// A zeroed array of the given extents, deep enough for the kernels.
    pub fn array(&self, sizes: Vec<usize>) -> Result<Array<T>, StencilError> {
        self.array_with(ArrayConfig::new(sizes))
    }

    /// A zeroed array built from `config`, deep enough for the kernels.
    pub fn array_with(&self, config: ArrayConfig<T>) -> Result<Array<T>, StencilError> {
        if config.sizes.len() != self.kernels.rank() {
            return Err(StencilError::InvalidDomain {
                reason: format!(
                    "array of rank {} for kernels of rank {}",
                    config.sizes.len(),
                    self.kernels.rank()
                ),
            });
        }
        Array::new(config, self.kernels.ring_depth())
    }

    /// Generate a plan for `timesteps` steps over `domain`.
    ///
    /// `boundary` decides whether the domain is treated as periodic.
    pub fn gen_plan(
        &self,
        domain: &Domain,
        boundary: &BoundaryPolicy<T>,
        timesteps: u64,
    ) -> Result<Plan, StencilError> {
        self.generator
            .generate(domain, &self.kernels.slopes(), boundary.wraps(), timesteps)
    }

    /// Write `plan` to `sink`.
    pub fn store_plan<W: Write>(&self, plan: &Plan, sink: W) -> Result<(), StencilError> {
        PlanStore::store(plan, sink)
    }

    /// Read a plan from `source`.
    pub fn load_plan<R: Read>(&self, source: R) -> Result<Plan, StencilError> {
        PlanStore::load(source)
    }

    /// Execute `plan` over `array`.
    pub fn run_plan(&self, plan: &Plan, array: &mut Array<T>) -> Result<RunMetrics, StencilError> {
        PlanExecutor::new(&self.kernels, self.executor)?.run(plan, array)
    }

    /// Execute `plan` over `array`, checking the requested step count.
    pub fn run_plan_steps(
        &self,
        plan: &Plan,
        array: &mut Array<T>,
        timesteps: u64,
    ) -> Result<RunMetrics, StencilError> {
        PlanExecutor::new(&self.kernels, self.executor)?.run_steps(plan, array, timesteps)
    }

    /// Generate a plan for `array` and run it.
    pub fn run(&self, timesteps: u64, array: &mut Array<T>) -> Result<RunMetrics, StencilError> {
        let plan = self.gen_plan(array.domain(), array.boundary(), timesteps)?;
        self.run_plan(&plan, array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapeze_core::Shape;
    use trapeze_kernel::{Guard, Kernel, KernelCtx};

    fn copy_left() -> Stencil<f64> {
        let shape = Shape::from_rows(&[[0, 0, 0], [-1, 0, -1]]).unwrap();
        let mut kernels = GuardedKernelSet::new(2);
        kernels
            .register(
                "copy",
                Guard::always(),
                vec![Kernel::new(shape, |ctx: &KernelCtx<'_, f64>| ctx.at(-1, &[0, -1]))],
            )
            .unwrap();
        Stencil::new(kernels)
    }

    #[test]
    fn array_rank_must_match_kernels() {
        let s = copy_left();
        assert!(s.array(vec![4]).is_err());
        let a = s.array(vec![4, 4]).unwrap();
        assert_eq!(a.ring_depth(), 2);
    }

    #[test]
    fn run_generates_and_executes() {
        let s = copy_left()
            .with_generator(GeneratorConfig {
                leaf_volume: 16,
                ..Default::default()
            })
            .unwrap();
        let mut a = s
            .array_with(ArrayConfig::new(vec![4, 10]).boundary(BoundaryPolicy::Periodic))
            .unwrap();
        a.fill_with(0, |c| c[1] as f64);
        let m = s.run(3, &mut a).unwrap();
        assert_eq!(m.cells, 4 * 10 * 3);
        assert_eq!(a.get(3, &[2, 5]).unwrap(), 2.0);
        assert_eq!(a.get(3, &[2, 1]).unwrap(), 8.0);
    }

    #[test]
    fn invalid_settings_rejected() {
        assert!(copy_left()
            .with_generator(GeneratorConfig {
                leaf_volume: 0,
                ..Default::default()
            })
            .is_err());
        assert!(copy_left()
            .with_executor(ExecutorConfig {
                parallel: true,
                threads: Some(0),
            })
            .is_err());
    }
}
