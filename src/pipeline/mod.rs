//! Split-compile pipeline orchestration.
//!
//! - [`SplitPipelineBuilder`]: Fluent builder for constructing a pipeline
//! - [`SplitPipeline`]: Runs the stages for one document
//! - [`Stage`]: The stages a run moves through
//!
//! # Example
//!
//! ```ignore
//! use texsplit::{SplitConfig, SplitPipelineBuilder};
//!
//! let pipeline = SplitPipelineBuilder::new()
//!     .with_config(SplitConfig::new("thesis.tex"))
//!     .build()?;
//!
//! let report = pipeline.run()?;
//! ```

mod builder;
pub mod context;
mod orchestrator;
mod stage;

pub use builder::SplitPipelineBuilder;
pub use context::PipelineContext;
pub use orchestrator::SplitPipeline;
pub use stage::Stage;
