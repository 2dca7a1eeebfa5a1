use crate::artifact::PageArtifacts;
use crate::render::Renderer;
use std::sync::Arc;
use texsplit_executor::PartitionExecutor;

/// The collaborators shared by every stage of a run.
///
/// Created once by the `SplitPipelineBuilder`; all fields are read-only
/// during a run, so the same pipeline can be run repeatedly.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub renderer: Arc<dyn Renderer>,
    pub artifacts: Arc<dyn PageArtifacts>,
    pub executor: PartitionExecutor,
}
