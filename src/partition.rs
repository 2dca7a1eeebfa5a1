// src/partition.rs
//! Partition workers: one merged output file per page range.
//!
//! Workers only read the per-page files extracted into the session
//! directory and each writes a distinct `<part>_<stem>.pdf`, so they share
//! no mutable state and can run in any order.

use crate::artifact::PageArtifacts;
use crate::ranges::PageRange;
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use texsplit_executor::Executor;
use texsplit_pdf_composer::page_file_name;

/// Name of the output file for section `part`.
pub fn output_file_name(part: usize, stem: &str) -> String {
    format!("{}_{}.pdf", part, stem)
}

/// Input of a single partition worker.
#[derive(Debug, Clone)]
pub struct PartitionJob {
    pub range: PageRange,
    pub stem: String,
    /// Directory holding the extracted single-page files.
    pub pages_dir: PathBuf,
    /// Directory the merged output is written to.
    pub output_dir: PathBuf,
    /// How long the merge may take before the worker gives up on it.
    pub deadline: Option<Duration>,
}

impl PartitionJob {
    pub fn output_name(&self) -> String {
        output_file_name(self.range.part, &self.stem)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_name())
    }

    /// Where a merge under a deadline is written before it is moved to
    /// [`output_path`](Self::output_path). Lives in the scratch directory,
    /// so an abandoned merge never leaves a file next to the outputs.
    pub fn staging_path(&self) -> PathBuf {
        self.pages_dir.join(format!("merge_{}", self.output_name()))
    }

    /// The single-page files making up this range, in page order.
    pub fn page_files(&self) -> Vec<PathBuf> {
        self.range
            .pages()
            .map(|page| self.pages_dir.join(page_file_name(&self.stem, page)))
            .collect()
    }
}

/// Why a partition produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The pages could not be read, merged or written.
    Merge,
    /// The merge did not finish before the job's deadline.
    TimedOut,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Merge => f.write_str("merge failed"),
            FailureKind::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Result of one partition worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionOutcome {
    Success { part: usize, path: PathBuf },
    Failure { part: usize, name: String, kind: FailureKind, reason: String },
}

impl PartitionOutcome {
    pub fn part(&self) -> usize {
        match self {
            PartitionOutcome::Success { part, .. } | PartitionOutcome::Failure { part, .. } => *part,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PartitionOutcome::Success { .. })
    }
}

struct MergeFailure {
    kind: FailureKind,
    reason: String,
}

impl MergeFailure {
    fn merge(reason: impl ToString) -> Self {
        Self { kind: FailureKind::Merge, reason: reason.to_string() }
    }
}

/// Merges the pages of `job.range` into its output file.
///
/// Never fails outright: errors become a [`PartitionOutcome::Failure`]
/// carrying the expected output name, the kind of failure and the reason.
pub fn run_partition(job: &PartitionJob, artifacts: &Arc<dyn PageArtifacts>) -> PartitionOutcome {
    let start = Instant::now();
    let part = job.range.part;
    let files = job.page_files();
    let pages = files.len();

    let merged = match job.deadline {
        None => artifacts.merge_pages(&files, &job.output_path()).map_err(MergeFailure::merge),
        Some(deadline) => merge_with_deadline(job, files, artifacts.clone(), deadline),
    };

    match merged {
        Ok(path) => {
            debug!("[PART-{}] Wrote {} ({} pages) in {:?}", part, path.display(), pages, start.elapsed());
            PartitionOutcome::Success { part, path }
        }
        Err(MergeFailure { kind, reason }) => {
            warn!("[PART-{}] Failed to create {} ({}): {}", part, job.output_name(), kind, reason);
            PartitionOutcome::Failure { part, name: job.output_name(), kind, reason }
        }
    }
}

/// Runs the merge on its own thread and waits at most `deadline` for it.
///
/// A merge that overruns is abandoned, not cancelled. It keeps writing to
/// the staging path until it finishes, and the file goes away with the
/// session directory.
fn merge_with_deadline(
    job: &PartitionJob,
    files: Vec<PathBuf>,
    artifacts: Arc<dyn PageArtifacts>,
    deadline: Duration,
) -> Result<PathBuf, MergeFailure> {
    let staged = job.staging_path();
    let (tx, rx) = mpsc::channel();
    let dest = staged.clone();
    thread::Builder::new()
        .name(format!("texsplit-merge-{}", job.range.part))
        .spawn(move || {
            // The receiver is gone once the deadline has passed.
            let _ = tx.send(artifacts.merge_pages(&files, &dest));
        })
        .map_err(MergeFailure::merge)?;

    match rx.recv_timeout(deadline) {
        Ok(Ok(_)) => {
            let output = job.output_path();
            // The scratch directory may be on another file system.
            std::fs::rename(&staged, &output)
                .or_else(|_| std::fs::copy(&staged, &output).map(|_| ()))
                .map_err(MergeFailure::merge)?;
            Ok(output)
        }
        Ok(Err(e)) => Err(MergeFailure::merge(e)),
        Err(RecvTimeoutError::Timeout) => Err(MergeFailure {
            kind: FailureKind::TimedOut,
            reason: format!("merge did not finish within {:?}", deadline),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(MergeFailure::merge("merge thread exited without a result")),
    }
}

/// Runs every job on `executor` and returns their outcomes sorted by part.
///
/// Returns only after all workers have finished; a failing worker does not
/// cut the others short.
pub fn run_partitions<E: Executor>(
    executor: &E,
    artifacts: Arc<dyn PageArtifacts>,
    jobs: Vec<PartitionJob>,
) -> Vec<PartitionOutcome> {
    let start = Instant::now();
    let count = jobs.len();
    info!("Merging {} partition(s) on {} ({} threads)", count, executor.name(), executor.parallelism());

    let mut outcomes = executor.run_batch(jobs, move |job| run_partition(&job, &artifacts));
    outcomes.sort_by_key(PartitionOutcome::part);

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!("{}/{} partition(s) succeeded in {:?}", succeeded, count, start.elapsed());
    outcomes
}
