use crate::PartitionExecutor;
use crate::executor::{ExecutorError, SyncExecutor};

/// How the merge jobs of a run are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerPlan {
    /// One job after another on the calling thread.
    Sequential,
    /// Rayon's global pool, one thread per core.
    #[default]
    SharedPool,
    /// A dedicated pool of exactly this many threads.
    Threads(usize),
}

impl WorkerPlan {
    /// Maps the `sequential` flag and the requested worker count onto a
    /// plan. `sequential` takes precedence over `jobs`.
    pub fn from_settings(sequential: bool, jobs: Option<usize>) -> Self {
        match (sequential, jobs) {
            (true, _) => WorkerPlan::Sequential,
            (false, Some(threads)) => WorkerPlan::Threads(threads),
            (false, None) => WorkerPlan::SharedPool,
        }
    }

    /// Creates the executor for this plan.
    ///
    /// Without the `rayon` feature every plan runs sequentially.
    pub fn build(self) -> Result<PartitionExecutor, ExecutorError> {
        if self == WorkerPlan::Threads(0) {
            return Err(ExecutorError::ZeroThreads);
        }

        #[cfg(feature = "rayon")]
        {
            use crate::RayonExecutor;
            match self {
                WorkerPlan::Sequential => Ok(PartitionExecutor::Sequential(SyncExecutor::new())),
                WorkerPlan::SharedPool => Ok(PartitionExecutor::Pool(RayonExecutor::new())),
                WorkerPlan::Threads(threads) => Ok(PartitionExecutor::Pool(RayonExecutor::with_threads(threads)?)),
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            if self != WorkerPlan::Sequential {
                log::warn!("Built without rayon; running {:?} sequentially", self);
            }
            Ok(PartitionExecutor::Sequential(SyncExecutor::new()))
        }
    }
}
