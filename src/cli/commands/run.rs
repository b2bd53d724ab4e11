//! Run command implementation
//!
//! Loads the configuration, then lists, runs one report, or runs them all.
//!
//! Exit codes: 0 on success, 1 when a report failed, 2 for configuration
//! and usage errors.

use crate::adapters::AdapterRegistry;
use crate::config::Config;
use crate::core::runner::{FailurePolicy, Runner, RunnerOptions};
use anyhow::{bail, Context};
use clap::Args;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Arguments for running reports
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Base directory for relative paths
    #[arg(long, env = "HARBOR_PWD")]
    pub pwd: Option<PathBuf>,

    /// Run every report in the configuration
    #[arg(short, long)]
    pub all: bool,

    /// List available reports
    #[arg(short, long)]
    pub list: bool,

    /// Keep saving the remaining results after one fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Report name followed by extra `--key value` arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "REPORT")]
    pub args: Vec<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (report, extra_args) = match split_invocation_args(&self.args) {
            Ok(split) => split,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        let config = match Config::from_file(config_path, self.pwd.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, path = %config_path, "Failed to load configuration");
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        if self.list {
            let mut names = config.report_names();
            names.sort_unstable();
            println!("Reports available:\n");
            for name in names {
                println!("\t- {name}");
            }
            println!();
        }

        if report.is_none() && !self.all {
            if self.list {
                return Ok(0);
            }
            eprintln!("Please specify the report to run. Run with -h to see help message.");
            return Ok(2);
        }

        let options = RunnerOptions::default()
            .with_failure_policy(self.failure_policy())
            .with_extra_args(extra_args);

        let runner = match Runner::new(config, AdapterRegistry::with_builtins(), options) {
            Ok(runner) => runner,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        if let Some(name) = report {
            return match runner.run_report(&name).await {
                Ok(summary) => {
                    println!(
                        "Report '{}' completed: {} result(s) saved in {:.2}s",
                        summary.report,
                        summary.results_saved,
                        summary.duration.as_secs_f64()
                    );
                    Ok(0)
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("report '{name}'"));
                    eprintln!("Error: {e}");
                    Ok(1)
                }
            };
        }

        let summary = runner.run_all().await;
        println!(
            "{} of {} report(s) completed in {:.2}s",
            summary.completed.len(),
            summary.total(),
            summary.duration.as_secs_f64()
        );
        if summary.is_successful() {
            Ok(0)
        } else {
            for failure in &summary.failures {
                eprintln!("  {}: {}", failure.report, failure.error);
            }
            Ok(1)
        }
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.continue_on_error {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        }
    }
}

/// Splits trailing arguments into a report name and extra arguments
///
/// The first token is the report name unless it starts with `--`. The rest
/// must be `--key value` pairs (or `--key=value`). Values that parse as
/// JSON objects or arrays become JSON; everything else stays a string.
pub fn split_invocation_args(args: &[String]) -> anyhow::Result<(Option<String>, Map<String, Value>)> {
    let mut tokens = args.iter().peekable();
    let report = match tokens.peek() {
        Some(first) if !first.starts_with("--") => tokens.next().cloned(),
        _ => None,
    };

    let mut extra = Map::new();
    while let Some(token) = tokens.next() {
        let Some(key) = token.strip_prefix("--") else {
            bail!("Unexpected argument '{token}', expected --key value");
        };

        let (key, raw) = match key.split_once('=') {
            Some((key, value)) => (key, value.to_string()),
            None => {
                let value = tokens
                    .next()
                    .with_context(|| format!("Missing value for argument '--{key}'"))?;
                (key, value.clone())
            }
        };

        if key.is_empty() {
            bail!("Empty argument name in '{token}'");
        }
        extra.insert(key.to_string(), parse_value(raw));
    }

    Ok((report, extra))
}

// Template values such as `{t-1d}` also start with a brace, so text that
// does not parse as JSON stays a string.
fn parse_value(raw: String) -> Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(&raw) {
            return value;
        }
    }
    Value::String(raw)
}
