//! The seam between partition scheduling and threads.
//!
//! Merge jobs are handed over as one batch. The executor decides whether they
//! run one after another or on a pool, and the call returns only once every
//! job has finished.

use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("A worker pool needs at least one thread")]
    ZeroThreads,

    #[error("Failed to start {threads} worker thread(s): {reason}")]
    PoolBuild { threads: usize, reason: String },
}

/// Runs a batch of independent jobs to completion.
///
/// Jobs must not depend on each other; they may run in any order and on any
/// thread. Errors are the job's business: a job that reports failure through
/// its return value has no effect on the rest of the batch.
pub trait Executor: Send + Sync + Debug {
    /// Applies `f` to every job and returns the results in input order.
    fn run_batch<T, R, F>(&self, jobs: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Upper bound on how many jobs run at the same time.
    fn parallelism(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Runs jobs one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn run_batch<T, R, F>(&self, jobs: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        jobs.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}
