//! Executors for the texsplit merge stage.
//!
//! A run turns its worker settings into a [`WorkerPlan`], and the plan into
//! a [`PartitionExecutor`] that every merge job of the run is handed to.
//!
//! ```ignore
//! use texsplit_executor::{Executor, WorkerPlan};
//!
//! let executor = WorkerPlan::from_settings(false, Some(4)).build()?;
//! let sizes = executor.run_batch(vec![3, 4, 3], |pages| pages * 2);
//! ```

mod executor;
mod plan;
#[cfg(feature = "rayon")]
mod rayon_executor;

pub use executor::{Executor, ExecutorError, SyncExecutor};
pub use plan::WorkerPlan;
#[cfg(feature = "rayon")]
pub use rayon_executor::RayonExecutor;

/// The executor a run actually uses.
///
/// `Executor` has generic methods and cannot be a trait object, so the
/// concrete executors are held in an enum instead.
#[derive(Clone, Debug)]
pub enum PartitionExecutor {
    Sequential(SyncExecutor),
    #[cfg(feature = "rayon")]
    Pool(RayonExecutor),
}

impl Executor for PartitionExecutor {
    fn run_batch<T, R, F>(&self, jobs: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match self {
            PartitionExecutor::Sequential(exec) => exec.run_batch(jobs, f),
            #[cfg(feature = "rayon")]
            PartitionExecutor::Pool(exec) => exec.run_batch(jobs, f),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            PartitionExecutor::Sequential(exec) => exec.parallelism(),
            #[cfg(feature = "rayon")]
            PartitionExecutor::Pool(exec) => exec.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PartitionExecutor::Sequential(exec) => exec.name(),
            #[cfg(feature = "rayon")]
            PartitionExecutor::Pool(exec) => exec.name(),
        }
    }
}
