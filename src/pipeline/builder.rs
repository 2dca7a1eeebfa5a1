// src/pipeline/builder.rs
use super::context::PipelineContext;
use super::orchestrator::SplitPipeline;
use super::stage::Stage;
use crate::artifact::{LopdfArtifacts, PageArtifacts};
use crate::config::{ConfigError, SplitConfig};
use crate::error::SplitError;
use crate::render::{ProcessRenderer, Renderer};
use std::sync::Arc;
use texsplit_executor::{PartitionExecutor, WorkerPlan};

/// A builder for creating a `SplitPipeline`.
///
/// Only the configuration is required. The renderer defaults to running the
/// configured executable, pages are handled with lopdf, and partitions run
/// on rayon unless the configuration asks for sequential execution.
#[derive(Debug, Default)]
pub struct SplitPipelineBuilder {
    config: Option<SplitConfig>,
    renderer: Option<Arc<dyn Renderer>>,
    artifacts: Option<Arc<dyn PageArtifacts>>,
    executor: Option<PartitionExecutor>,
}

impl SplitPipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: SplitConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the process-based renderer.
    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Replaces the lopdf page operations.
    pub fn with_artifacts<A: PageArtifacts + 'static>(mut self, artifacts: A) -> Self {
        self.artifacts = Some(Arc::new(artifacts));
        self
    }

    /// Overrides the executor the configuration would select.
    pub fn with_executor(mut self, executor: PartitionExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validates the configuration and assembles the pipeline.
    pub fn build(self) -> Result<SplitPipeline, SplitError> {
        let config = self
            .config
            .ok_or_else(|| SplitError::new(Stage::Created, ConfigError::Missing))?;
        config.validate().map_err(|e| SplitError::new(Stage::Created, e))?;
        let stem = config.stem().map_err(|e| SplitError::new(Stage::Created, e))?;

        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(
                ProcessRenderer::new(config.renderer.clone())
                    .with_args(config.render_args(&stem))
                    .with_timeout(config.render_timeout),
            ),
        };
        let artifacts = self.artifacts.unwrap_or_else(|| Arc::new(LopdfArtifacts));
        let executor = match self.executor {
            Some(executor) => executor,
            None => WorkerPlan::from_settings(config.sequential, config.jobs)
                .build()
                .map_err(|e| SplitError::new(Stage::Created, e))?,
        };

        log::debug!(
            "Built pipeline for {} (renderer: {}, executor: {})",
            config.document.display(),
            renderer.name(),
            texsplit_executor::Executor::name(&executor)
        );

        let context = PipelineContext { renderer, artifacts, executor };
        Ok(SplitPipeline::new(config, stem, context))
    }
}
