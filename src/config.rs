//! Run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Renderer used when none is configured.
pub const DEFAULT_RENDERER: &str = "pdflatex";

/// Sentinel line marking a split point when none is configured.
pub const DEFAULT_SPLIT_LINE: &str = "% latexsplit";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration has been provided. Use `with_config`.")]
    Missing,

    #[error("Could not find file {}", .0.display())]
    MissingDocument(PathBuf),

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("Cannot derive a job name from {}", .0.display())]
    InvalidStem(PathBuf),

    #[error("Working directory {} does not exist", .0.display())]
    MissingWorkingDir(PathBuf),

    #[error("The split line must not be empty")]
    EmptySplitLine,

    #[error("The renderer name must not be empty")]
    EmptyRenderer,

    #[error("Worker count must be at least 1")]
    ZeroJobs,

    #[error("The partition timeout must be longer than zero")]
    ZeroPartitionTimeout,

    #[error("Cannot parse renderer arguments: {0}")]
    RendererArgs(#[from] shell_words::ParseError),
}

/// Everything one run of the pipeline needs to know.
///
/// Built with [`SplitConfig::new`] and the `with_*` setters; the CLI maps
/// its flags onto the same setters.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// The LaTeX source to compile.
    pub document: PathBuf,
    /// Renderer executable, looked up on `PATH`.
    pub renderer: String,
    /// Extra renderer arguments, passed after `-jobname=<stem>`.
    pub renderer_args: Vec<String>,
    /// Lines exactly equal to this text become split points.
    pub split_line: String,
    /// Directory the renderer runs in; the rendered PDF, its log and the
    /// split outputs all land here.
    pub working_dir: PathBuf,
    /// Parent directory for the session's scratch directory. Defaults to
    /// the system temp directory.
    pub scratch_root: Option<PathBuf>,
    /// Deadline for the renderer process.
    pub render_timeout: Option<Duration>,
    /// Deadline for each partition merge. A merge that overruns is
    /// reported as timed out and the other partitions carry on.
    pub partition_timeout: Option<Duration>,
    /// Number of partition worker threads. Defaults to one per core.
    pub jobs: Option<usize>,
    /// Run partition workers one after another on the calling thread.
    pub sequential: bool,
}

impl SplitConfig {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            renderer: DEFAULT_RENDERER.to_string(),
            renderer_args: Vec::new(),
            split_line: DEFAULT_SPLIT_LINE.to_string(),
            working_dir: PathBuf::from("."),
            scratch_root: None,
            render_timeout: None,
            partition_timeout: None,
            jobs: None,
            sequential: false,
        }
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = renderer.into();
        self
    }

    pub fn with_renderer_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.renderer_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_split_line(mut self, split_line: impl Into<String>) -> Self {
        self.split_line = split_line.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn with_render_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_partition_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.partition_timeout = timeout;
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// The document's base name without extension. The renderer is asked
    /// to use it as its job name, so `<stem>.pdf` and `<stem>.log` are
    /// predictable.
    pub fn stem(&self) -> Result<String, ConfigError> {
        self.document
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidStem(self.document.clone()))
    }

    /// Full renderer argument list: the job name first, then the extras.
    pub fn render_args(&self, stem: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(self.renderer_args.len() + 1);
        args.push(format!("-jobname={}", stem));
        args.extend(self.renderer_args.iter().cloned());
        args
    }

    /// Path of a renderer output named after the job, e.g. `<stem>.log`.
    pub fn rendered_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.working_dir.join(format!("{}.{}", stem, extension))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_document(&self.document)?;
        self.stem()?;
        if !self.working_dir.is_dir() {
            return Err(ConfigError::MissingWorkingDir(self.working_dir.clone()));
        }
        if self.split_line.is_empty() {
            return Err(ConfigError::EmptySplitLine);
        }
        if self.renderer.trim().is_empty() {
            return Err(ConfigError::EmptyRenderer);
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        if self.partition_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroPartitionTimeout);
        }
        Ok(())
    }
}

fn check_document(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingDocument(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ConfigError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Splits a renderer argument string such as `"-interaction=nonstopmode -shell-escape"`
/// the way a POSIX shell would, so quoted arguments may contain spaces.
pub fn parse_renderer_args(args: &str) -> Result<Vec<String>, ConfigError> {
    Ok(shell_words::split(args)?)
}
