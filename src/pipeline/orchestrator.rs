// src/pipeline/orchestrator.rs
use super::context::PipelineContext;
use super::stage::Stage;
use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::inject::inject_markers;
use crate::log_scan::scan_log;
use crate::partition::{run_partitions, PartitionJob};
use crate::ranges::{compute_ranges, PageRange};
use crate::report::SplitReport;
use crate::session::Session;
use log::{debug, info, warn};
use std::time::Instant;

/// Runs the split-compile stages for one document.
///
/// Built by the `SplitPipelineBuilder`. A run moves through [`Stage`] in
/// order; any fatal error is tagged with the stage that was being entered.
/// Partition failures are not fatal and are collected in the report.
#[derive(Debug)]
pub struct SplitPipeline {
    config: SplitConfig,
    stem: String,
    context: PipelineContext,
}

impl SplitPipeline {
    pub(super) fn new(config: SplitConfig, stem: String, context: PipelineContext) -> Self {
        Self { config, stem, context }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// The job name the renderer is asked to use.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Runs the whole pipeline once.
    ///
    /// The session's scratch directory is removed before returning, whether
    /// the run succeeded or not.
    pub fn run(&self) -> Result<SplitReport, SplitError> {
        let start = Instant::now();
        let session = match &self.config.scratch_root {
            Some(root) => Session::new_in(root).map_err(|e| SplitError::io(Stage::Created, root, e))?,
            None => Session::new().map_err(|e| SplitError::io(Stage::Created, std::env::temp_dir(), e))?,
        };
        info!("[{}] Session {} for {}", Stage::Created, session.id(), self.config.document.display());

        let result = self.run_stages(&session);

        let session_dir = session.dir().to_path_buf();
        if let Err(e) = session.close() {
            warn!("Failed to remove session directory {}: {}", session_dir.display(), e);
        }

        match &result {
            Ok(report) => info!(
                "[{}] {} created, {} failed, {} skipped in {:?}",
                Stage::Completed,
                report.succeeded.len(),
                report.failed.len(),
                report.skipped.len(),
                start.elapsed()
            ),
            Err(e) => warn!("Run aborted: {}", e),
        }
        result
    }

    fn run_stages(&self, session: &Session) -> Result<SplitReport, SplitError> {
        let config = &self.config;
        let ctx = &self.context;

        let source = inject_markers(&config.document, &config.split_line, session)
            .map_err(|e| SplitError::io(Stage::Injected, &config.document, e))?;
        let markers = source.markers;
        info!("[{}] {} split point(s) in {} line(s)", Stage::Injected, markers, source.lines.len());

        let render_start = Instant::now();
        ctx.renderer
            .render(&source.lines, &config.working_dir)
            .map_err(|e| SplitError::new(Stage::Rendered, e))?;
        info!("[{}] {} finished in {:?}", Stage::Rendered, ctx.renderer.name(), render_start.elapsed());

        let log_path = config.rendered_path(&self.stem, "log");
        let boundaries = scan_log(&log_path, session.id()).map_err(|e| SplitError::new(Stage::LogScanned, e))?;
        if boundaries.len() != markers {
            warn!(
                "Injected {} split point(s) but found {} in {}",
                markers,
                boundaries.len(),
                log_path.display()
            );
        }
        debug!("[{}] Boundaries: {:?}", Stage::LogScanned, boundaries);

        let pdf_path = config.rendered_path(&self.stem, "pdf");
        let total_pages = ctx
            .artifacts
            .page_count(&pdf_path)
            .map_err(|e| SplitError::new(Stage::RangesComputed, e))?;
        let ranges = compute_ranges(&boundaries, total_pages);
        info!("[{}] {} section(s) over {} page(s)", Stage::RangesComputed, ranges.len(), total_pages);

        let (empty, ranges): (Vec<PageRange>, Vec<PageRange>) = ranges.into_iter().partition(PageRange::is_empty);
        for range in &empty {
            warn!("Skipping {}: no pages between its split points", range);
        }
        let skipped = empty.iter().map(|range| range.part).collect();

        if !ranges.is_empty() {
            let pages = ctx
                .artifacts
                .split_into_pages(&pdf_path, session.dir(), &self.stem)
                .map_err(|e| SplitError::new(Stage::Partitioning, e))?;
            debug!("[{}] Extracted {} page file(s) into {}", Stage::Partitioning, pages.len(), session.dir().display());
        }

        let jobs = ranges
            .into_iter()
            .map(|range| PartitionJob {
                range,
                stem: self.stem.clone(),
                pages_dir: session.dir().to_path_buf(),
                output_dir: config.working_dir.clone(),
                deadline: config.partition_timeout,
            })
            .collect();
        let outcomes = run_partitions(&ctx.executor, ctx.artifacts.clone(), jobs);

        Ok(SplitReport::from_outcomes(session.id(), total_pages, outcomes, skipped))
    }
}
