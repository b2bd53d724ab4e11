//! Report execution
//!
//! [`Runner`] executes a report: one source, then each result in order.
//! [`Runner::run_all`] runs every report and collects the failures in a
//! [`RunSummary`].

pub mod pipeline;
pub mod summary;

pub use pipeline::{FailurePolicy, Runner, RunnerOptions};
pub use summary::{ReportFailure, ReportSummary, RunSummary};
