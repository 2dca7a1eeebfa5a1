//! Rayon-based parallel executor.

use crate::executor::{Executor, ExecutorError};
use rayon::prelude::*;
use std::sync::Arc;

/// Runs jobs on a rayon work-stealing pool.
///
/// [`RayonExecutor::new`] uses rayon's global pool, sized to the number of
/// cores. [`RayonExecutor::with_threads`] builds a dedicated pool and leaves
/// the global one alone.
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
    num_threads: usize,
}

impl RayonExecutor {
    pub fn new() -> Self {
        Self { pool: None, num_threads: rayon::current_num_threads() }
    }

    /// Builds a dedicated pool of `num_threads` threads named
    /// `texsplit-worker-<n>`.
    pub fn with_threads(num_threads: usize) -> Result<Self, ExecutorError> {
        if num_threads == 0 {
            return Err(ExecutorError::ZeroThreads);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("texsplit-worker-{}", index))
            .build()
            .map_err(|e| ExecutorError::PoolBuild { threads: num_threads, reason: e.to_string() })?;
        log::debug!("Started a pool of {} worker thread(s)", num_threads);
        Ok(Self { pool: Some(Arc::new(pool)), num_threads })
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn run_batch<T, R, F>(&self, jobs: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match &self.pool {
            Some(pool) => pool.install(|| jobs.into_par_iter().map(f).collect()),
            None => jobs.into_par_iter().map(f).collect(),
        }
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "rayon"
    }
}
