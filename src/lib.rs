//! # texsplit
//!
//! Compiles a LaTeX document once and splits the resulting PDF into one
//! file per marked section.
//!
//! Split points are sentinel lines in the source (by default
//! `% latexsplit`). Each sentinel is replaced with a `\typeout` directive
//! carrying a per-run session token, so the renderer records the physical
//! page of every split point in its log. The log is scanned for those
//! records, the page boundaries are turned into ranges, and every range is
//! merged into its own PDF concurrently.
//!
//! ## Pipeline
//!
//! - **inject**: sentinel lines become boundary markers
//! - **render**: the document is streamed to the renderer's stdin
//! - **log_scan**: boundary pages are recovered from `<stem>.log`
//! - **ranges**: boundaries become contiguous page ranges
//! - **partition**: one merge per range, fanned out over an executor
//! - **session**: the run's token and scratch directory
//!
//! ## Example
//!
//! ```ignore
//! use texsplit::{SplitConfig, SplitPipelineBuilder};
//!
//! let config = SplitConfig::new("thesis.tex").with_split_line("% split here");
//! let report = SplitPipelineBuilder::new().with_config(config).build()?.run()?;
//! println!("{}", report);
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod inject;
pub mod log_scan;
pub mod partition;
pub mod pipeline;
pub mod ranges;
pub mod render;
pub mod report;
pub mod session;

pub use artifact::{LopdfArtifacts, PageArtifacts};
pub use config::{ConfigError, SplitConfig, DEFAULT_RENDERER, DEFAULT_SPLIT_LINE};
pub use inject::InjectedSource;
pub use error::{LogScanError, RenderError, SplitError, SplitErrorKind};
pub use partition::{FailureKind, PartitionOutcome};
pub use pipeline::{SplitPipeline, SplitPipelineBuilder, Stage};
pub use ranges::PageRange;
pub use render::{ProcessRenderer, Renderer};
pub use report::{FailedPart, Outcome, SplitReport};
pub use session::Session;

// Re-export the executor and PDF crates for callers that configure them directly
pub use texsplit_executor as executor;
pub use texsplit_pdf_composer as composer;
