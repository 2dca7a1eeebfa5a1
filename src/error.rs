// src/error.rs
//! Error types for the split-compile pipeline.
//!
//! Everything in here is fatal to a run. Per-partition failures are not
//! errors at this level; they travel as [`crate::PartitionOutcome::Failure`]
//! values and end up in the report.

use crate::config::ConfigError;
use crate::pipeline::Stage;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use texsplit_executor::ExecutorError;
use texsplit_pdf_composer::ComposerError;
use thiserror::Error;

/// Failures of the external renderer process.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer '{program}' failed with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("Renderer '{program}' did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("Failed while waiting for renderer '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while scanning the renderer log for boundary markers.
#[derive(Error, Debug)]
pub enum LogScanError {
    #[error("Cannot read renderer log '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// What went wrong in a failed run.
#[derive(Error, Debug)]
pub enum SplitErrorKind {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    LogScan(#[from] LogScanError),

    #[error("PDF processing error: {0}")]
    Artifact(#[from] ComposerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// A fatal pipeline failure, tagged with the stage the pipeline was trying
/// to reach when it failed.
#[derive(Error, Debug)]
#[error("{stage} failed: {kind}")]
pub struct SplitError {
    pub stage: Stage,
    pub kind: SplitErrorKind,
}

impl SplitError {
    pub fn new(stage: Stage, kind: impl Into<SplitErrorKind>) -> Self {
        Self { stage, kind: kind.into() }
    }

    pub(crate) fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self { stage, kind: SplitErrorKind::Io { path: path.into(), source } }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> &SplitErrorKind {
        &self.kind
    }
}
