//! Run summaries
//!
//! Outcome of one report ([`ReportSummary`]) and of a whole `--all` run
//! ([`RunSummary`]).

use crate::domain::HarborError;
use std::time::Duration;

/// Outcome of a successful report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Report name
    pub report: String,

    /// `(rows, columns)` of the source output, `None` for raw data
    pub shape: Option<(usize, usize)>,

    /// Number of results saved
    pub results_saved: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl ReportSummary {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            shape: None,
            results_saved: 0,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// A report that failed during a run of every report
#[derive(Debug)]
pub struct ReportFailure {
    /// Report name
    pub report: String,

    /// Why it failed
    pub error: HarborError,
}

/// Summary of running every configured report
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Reports that completed, in run order
    pub completed: Vec<ReportSummary>,

    /// Reports that failed, in run order
    pub failures: Vec<ReportFailure>,

    /// Duration of the whole run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_completed(&mut self, summary: ReportSummary) {
        self.completed.push(summary);
    }

    pub fn add_failure(&mut self, report: impl Into<String>, error: HarborError) {
        self.failures.push(ReportFailure {
            report: report.into(),
            error,
        });
    }

    /// Number of reports attempted
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    /// True when no report failed
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the failed reports, in run order
    pub fn failed_reports(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.report.as_str()).collect()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            completed = self.completed.len(),
            failed = self.failures.len(),
            duration_ms = self.duration.as_millis(),
            "Run completed"
        );

        for failure in &self.failures {
            tracing::warn!(
                report = %failure.report,
                error = %failure.error,
                "Report failed"
            );
        }
    }
}
