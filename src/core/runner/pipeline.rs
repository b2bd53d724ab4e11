//! Report pipeline
//!
//! Running a report is a fixed sequence: look the report up, resolve the
//! source type and every result type (nothing is built if one is unknown),
//! run the source, then build and save each result in declared order with
//! its own copy of the data.

use super::summary::{ReportSummary, RunSummary};
use crate::adapters::{AdapterContext, AdapterFields, AdapterRegistry};
use crate::config::Config;
use crate::domain::{DeliveryFailure, HarborError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// What to do when a result (or a partition) fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failure
    #[default]
    Abort,
    /// Attempt every result, then report all failures
    Continue,
}

/// Per-invocation runner settings
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    pub failure_policy: FailurePolicy,

    /// Merged into every report's and result's fields, overriding them.
    /// `timezone`, `now` and `pwd` also override the global settings.
    pub extra_args: AdapterFields,
}

impl RunnerOptions {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_extra_args(mut self, extra_args: AdapterFields) -> Self {
        self.extra_args = extra_args;
        self
    }
}

/// Runs reports from a configuration
#[derive(Debug)]
pub struct Runner {
    config: Arc<Config>,
    registry: Arc<AdapterRegistry>,
    options: RunnerOptions,
}

impl Runner {
    /// Creates a runner, applying global overrides from the extra arguments
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an overridden `timezone` or `now`
    /// is invalid.
    pub fn new(mut config: Config, registry: AdapterRegistry, options: RunnerOptions) -> Result<Self> {
        config.overwrite_globals(&options.extra_args)?;

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            options,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Runs one report
    ///
    /// # Errors
    ///
    /// - [`HarborError::ReportNotFound`] for an unknown report name
    /// - [`HarborError::UnknownAdapterType`] if the source type or any
    ///   result type is not registered; nothing runs in that case
    /// - [`HarborError::ReportExecution`] if the source cannot be built or
    ///   fails; no result is attempted
    /// - [`HarborError::ResultExecution`] listing every failed result
    pub async fn run_report(&self, name: &str) -> Result<ReportSummary> {
        let started = Instant::now();
        let report = self.config.report(name)?;
        crate::log_report_start!(report.name, report.report_type);

        let source_factory = self.registry.resolve_source(&report.report_type)?;
        let sink_factories = report
            .results
            .iter()
            .map(|result| self.registry.resolve_sink(&result.result_type))
            .collect::<Result<Vec<_>>>()?;

        let ctx = AdapterContext::new(
            Arc::clone(&self.config),
            Arc::clone(&self.registry),
            self.options.failure_policy,
        );

        let report_failed = |e: HarborError| HarborError::ReportExecution {
            report: report.name.clone(),
            message: e.to_string(),
        };

        let fields = self.merge_extra(report.adapter_fields());
        let mut source = source_factory(&ctx, &fields).map_err(report_failed)?;
        let data = source.process().await.map_err(report_failed)?;

        let mut summary = ReportSummary::new(&report.name);
        summary.shape = data.shape();
        match summary.shape {
            Some((rows, columns)) => {
                tracing::info!(report = %report.name, rows, columns, "Report data fetched")
            }
            None => tracing::info!(report = %report.name, "Report returned raw data"),
        }

        let mut failures = Vec::new();
        for (index, (factory, result)) in sink_factories.iter().zip(&report.results).enumerate() {
            tracing::info!(
                report = %report.name,
                result_type = %result.result_type,
                index,
                "Saving result"
            );

            let fields = self.merge_extra(result.adapter_fields());
            let outcome = match factory(&ctx, data.clone(), &fields) {
                Ok(mut sink) => sink.save().await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    summary.results_saved += 1;
                    crate::log_result_saved!(report.name, index, result.result_type);
                }
                Err(e) => {
                    crate::log_error_with_context!(
                        &e,
                        format!("result #{index} ({}) of report '{}'", result.result_type, report.name)
                    );
                    failures.push(DeliveryFailure::new(index, &result.result_type, e.to_string()));
                    if self.options.failure_policy == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(HarborError::ResultExecution {
                report: report.name.clone(),
                failures: failures.into(),
            });
        }

        Ok(summary.with_duration(started.elapsed()))
    }

    /// Runs every report in declaration order
    ///
    /// A failing report is logged and recorded; the remaining reports still
    /// run.
    pub async fn run_all(&self) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::new();

        for name in self.config.report_names() {
            match self.run_report(name).await {
                Ok(report) => summary.add_completed(report),
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("report '{name}'"));
                    summary.add_failure(name, e);
                }
            }
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        summary
    }

    fn merge_extra(&self, mut fields: AdapterFields) -> AdapterFields {
        for (key, value) in &self.options.extra_args {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_policy_default_and_serde() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Abort);
        let policy: FailurePolicy = serde_json::from_value(json!("continue")).unwrap();
        assert_eq!(policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_extra_args_override_fields() {
        let config = Config::build(json!({}), Some(std::path::Path::new("/"))).unwrap();
        let extra = json!({"filename": "override.csv", "variables": {"a": 1}});
        let runner = Runner::new(
            config,
            AdapterRegistry::with_builtins(),
            RunnerOptions::default().with_extra_args(extra.as_object().unwrap().clone()),
        )
        .unwrap();

        let merged = runner.merge_extra(
            json!({"name": "r", "filename": "orig.csv"})
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(merged["filename"], json!("override.csv"));
        assert_eq!(merged["name"], json!("r"));
        assert_eq!(merged["variables"], json!({"a": 1}));
    }

    #[test]
    fn test_invalid_global_override() {
        let config = Config::build(json!({}), Some(std::path::Path::new("/"))).unwrap();
        let extra = json!({"now": "not a date"});
        let result = Runner::new(
            config,
            AdapterRegistry::with_builtins(),
            RunnerOptions::default().with_extra_args(extra.as_object().unwrap().clone()),
        );
        assert!(result.is_err());
    }
}
