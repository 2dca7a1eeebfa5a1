//! The final account of a run: what was created, what failed, what was empty.

use crate::partition::{FailureKind, PartitionOutcome};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A section whose output file could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPart {
    pub part: usize,
    pub name: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Overall classification of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every attempted section was written.
    Complete,
    /// Some sections were written, some failed.
    Partial,
    /// Sections were attempted and none were written.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub session_id: String,
    pub total_pages: u32,
    /// Written output files, in part order.
    pub succeeded: Vec<PathBuf>,
    /// Sections that failed, in part order.
    pub failed: Vec<FailedPart>,
    /// Part indices of empty sections, which produce no file.
    pub skipped: Vec<usize>,
}

impl SplitReport {
    pub fn from_outcomes(
        session_id: impl Into<String>,
        total_pages: u32,
        outcomes: Vec<PartitionOutcome>,
        skipped: Vec<usize>,
    ) -> Self {
        let mut report = SplitReport { session_id: session_id.into(), total_pages, skipped, ..Default::default() };
        for outcome in outcomes {
            match outcome {
                PartitionOutcome::Success { path, .. } => report.succeeded.push(path),
                PartitionOutcome::Failure { part, name, kind, reason } => {
                    report.failed.push(FailedPart { part, name, kind, reason })
                }
            }
        }
        report
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn outcome(&self) -> Outcome {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => Outcome::Complete,
            (true, false) => Outcome::Failed,
            (false, false) => Outcome::Partial,
        }
    }

    /// Failed sections whose merge ran past its deadline.
    pub fn timed_out(&self) -> impl Iterator<Item = &FailedPart> {
        self.failed.iter().filter(|failure| failure.kind == FailureKind::TimedOut)
    }

    /// The report as pretty-printed JSON, including the outcome.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            outcome: Outcome,
            #[serde(flatten)]
            report: &'a SplitReport,
        }
        serde_json::to_string_pretty(&JsonReport { outcome: self.outcome(), report: self })
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.succeeded.is_empty() {
            writeln!(f, "Successfully created:")?;
            for path in &self.succeeded {
                writeln!(f, "{}", path.display())?;
            }
        }
        if !self.failed.is_empty() {
            writeln!(f, "Failed to generate the following files:")?;
            for failure in &self.failed {
                match failure.kind {
                    FailureKind::Merge => writeln!(f, "{}: {}", failure.name, failure.reason)?,
                    FailureKind::TimedOut => writeln!(f, "{}: timed out ({})", failure.name, failure.reason)?,
                }
            }
        }
        if !self.skipped.is_empty() {
            let parts: Vec<String> = self.skipped.iter().map(usize::to_string).collect();
            writeln!(f, "Skipped empty sections: {}", parts.join(", "))?;
        }
        if self.attempted() == 0 && self.skipped.is_empty() {
            writeln!(f, "No output files were produced.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(succeeded: usize, failed: usize) -> SplitReport {
        let mut outcomes = Vec::new();
        for part in 1..=succeeded {
            outcomes.push(PartitionOutcome::Success { part, path: PathBuf::from(format!("{}_doc.pdf", part)) });
        }
        for part in succeeded + 1..=succeeded + failed {
            outcomes.push(PartitionOutcome::Failure {
                part,
                name: format!("{}_doc.pdf", part),
                kind: FailureKind::Merge,
                reason: "missing page".into(),
            });
        }
        SplitReport::from_outcomes("id_texsplit", 10, outcomes, Vec::new())
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(report(3, 0).outcome(), Outcome::Complete);
        assert_eq!(report(2, 1).outcome(), Outcome::Partial);
        assert_eq!(report(0, 3).outcome(), Outcome::Failed);
        assert_eq!(report(0, 0).outcome(), Outcome::Complete);
    }

    #[test]
    fn test_display_lists_successes_then_failures() {
        let mut report = report(1, 1);
        report.skipped = vec![3, 4];
        assert_eq!(
            report.to_string(),
            "Successfully created:\n1_doc.pdf\n\
             Failed to generate the following files:\n2_doc.pdf: missing page\n\
             Skipped empty sections: 3, 4\n"
        );
    }

    #[test]
    fn test_json_includes_outcome() {
        let json: serde_json::Value = serde_json::from_str(&report(2, 1).to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"], "partial");
        assert_eq!(json["session_id"], "id_texsplit");
        assert_eq!(json["succeeded"].as_array().unwrap().len(), 2);
        assert_eq!(json["failed"][0]["part"], 3);
        assert_eq!(json["failed"][0]["kind"], "merge");
    }

    #[test]
    fn test_timed_out_sections_are_reported_separately() {
        let mut report = report(1, 2);
        report.failed[1].kind = FailureKind::TimedOut;
        report.failed[1].reason = "merge did not finish within 2s".into();

        assert_eq!(report.outcome(), Outcome::Partial);
        assert_eq!(report.timed_out().map(|f| f.part).collect::<Vec<_>>(), vec![3]);
        assert!(report.to_string().contains("3_doc.pdf: timed out (merge did not finish within 2s)\n"));
        assert!(report.to_string().contains("2_doc.pdf: missing page\n"));
    }
}
