use serde::Serialize;
use std::fmt;

/// The stages of a run, in order.
///
/// Everything up to `RangesComputed` is a sequential prerequisite; failing
/// to reach one of them ends the run with a [`crate::SplitError`] naming
/// that stage. `Partitioning` tolerates per-section failures and always
/// proceeds to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    Injected,
    Rendered,
    LogScanned,
    RangesComputed,
    Partitioning,
    Completed,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Created => Some(Stage::Injected),
            Stage::Injected => Some(Stage::Rendered),
            Stage::Rendered => Some(Stage::LogScanned),
            Stage::LogScanned => Some(Stage::RangesComputed),
            Stage::RangesComputed => Some(Stage::Partitioning),
            Stage::Partitioning => Some(Stage::Completed),
            Stage::Completed => None,
        }
    }

    /// The work that has to succeed to reach this stage.
    pub fn activity(self) -> &'static str {
        match self {
            Stage::Created => "session setup",
            Stage::Injected => "marker injection",
            Stage::Rendered => "rendering",
            Stage::LogScanned => "log scanning",
            Stage::RangesComputed => "range computation",
            Stage::Partitioning => "page extraction",
            Stage::Completed => "partition merging",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.activity())
    }
}
