//! Bash command source
//!
//! Runs an inline `script` (through `bash -c`) or a `script_file` and parses
//! its standard output. The inline script is rendered as an ISO template
//! first, so `{t-1d}` can be passed to the command.

use super::file::codec::{self, TabularFormat};
use super::traits::{decode_fields, AdapterContext, AdapterFields, Source};
use crate::core::template::FormatMode;
use crate::domain::{HarborError, ReportData, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Registered type name of the bash source
pub const BASH_TYPE: &str = "bash";

/// How standard output is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Array of JSON records
    #[default]
    Json,
    /// CSV with a header row
    Csv,
    /// Unparsed bytes
    Raw,
}

/// Fields of a `bash` report
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSourceConfig {
    #[serde(default)]
    pub script: Option<String>,

    #[serde(default)]
    pub script_file: Option<String>,

    #[serde(default)]
    pub result_type: OutputFormat,

    /// Kill the command after this many seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

#[derive(Debug, Clone)]
enum Script {
    Inline(String),
    File(PathBuf),
}

/// Source running a shell command
#[derive(Debug)]
pub struct CommandSource {
    script: Script,
    working_dir: PathBuf,
    output: OutputFormat,
    timeout: Option<Duration>,
}

impl CommandSource {
    pub fn new(ctx: &AdapterContext, config: CommandSourceConfig) -> Result<Self> {
        let script = match (config.script, config.script_file) {
            (Some(script), _) => {
                let rendered = ctx
                    .formatter(FormatMode::Iso, config.variables.as_ref())?
                    .format(&script)?;
                Script::Inline(rendered)
            }
            (None, Some(file)) => Script::File(ctx.resolve_path(file)),
            (None, None) => {
                return Err(HarborError::Configuration(
                    "'bash' reports need either 'script' or 'script_file'".to_string(),
                ))
            }
        };

        Ok(Self {
            script,
            working_dir: ctx.config().base_dir().to_path_buf(),
            output: config.result_type,
            timeout: config.timeout_seconds.map(Duration::from_secs),
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new("bash");
        match &self.script {
            Script::Inline(script) => command.arg("-c").arg(script),
            Script::File(path) => command.arg(path),
        };
        command
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn describe(&self) -> String {
        match &self.script {
            Script::Inline(script) => script.clone(),
            Script::File(path) => path.display().to_string(),
        }
    }
}

#[async_trait]
impl Source for CommandSource {
    async fn process(&mut self) -> Result<ReportData> {
        let description = self.describe();
        tracing::info!(command = %description, "Running command");

        let mut command = self.command();
        let running = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, running).await.map_err(|_| {
                HarborError::Adapter(format!(
                    "Command timed out after {}s: {description}",
                    limit.as_secs()
                ))
            })?,
            None => running.await,
        }
        .map_err(|e| HarborError::Adapter(format!("Failed to start bash: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarborError::Adapter(format!(
                "Command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(bytes = output.stdout.len(), "Command finished");
        match self.output {
            OutputFormat::Raw => Ok(ReportData::Raw(output.stdout)),
            OutputFormat::Json => Ok(codec::decode(&output.stdout, TabularFormat::Json)?.into()),
            OutputFormat::Csv => Ok(codec::decode(&output.stdout, TabularFormat::Csv)?.into()),
        }
    }
}

/// Factory registered under `bash`
pub fn build_source(ctx: &AdapterContext, fields: &AdapterFields) -> Result<Box<dyn Source>> {
    let config: CommandSourceConfig = decode_fields(BASH_TYPE, fields)?;
    Ok(Box::new(CommandSource::new(ctx, config)?))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::adapters::testing::context;
    use serde_json::json;
    use tempfile::TempDir;

    fn build(dir: &TempDir, fields: Value) -> Result<Box<dyn Source>> {
        build_source(&context(dir.path()), fields.as_object().unwrap())
    }

    #[tokio::test]
    async fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let mut source = build(
            &dir,
            json!({"script": r#"echo '[{"a": 1}, {"a": 2}]'"#}),
        )
        .unwrap();

        let data = source.process().await.unwrap();
        assert_eq!(data.shape(), Some((2, 1)));
    }

    #[tokio::test]
    async fn test_script_is_templated() {
        let dir = TempDir::new().unwrap();
        let mut source = build(
            &dir,
            json!({"script": "echo '{now}'", "result_type": "raw"}),
        )
        .unwrap();

        let data = source.process().await.unwrap();
        assert_eq!(data, ReportData::Raw(b"2016-02-12 18:19:09\n".to_vec()));
    }

    #[tokio::test]
    async fn test_csv_output_from_script_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.sh"), "printf 'x,y\\n1,a\\n'\n").unwrap();

        let mut source = build(
            &dir,
            json!({"script_file": "report.sh", "result_type": "csv"}),
        )
        .unwrap();

        let table = source.process().await.unwrap().into_table("test").unwrap();
        assert_eq!(table.columns(), &["x", "y"]);
        assert_eq!(table.rows()[0], vec![json!(1), json!("a")]);
    }

    #[tokio::test]
    async fn test_failing_command() {
        let dir = TempDir::new().unwrap();
        let mut source = build(&dir, json!({"script": "echo boom >&2; exit 3"})).unwrap();

        let err = source.process().await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let mut source = build(&dir, json!({"script": "sleep 5", "timeout_seconds": 1})).unwrap();

        let err = source.process().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_needs_a_script() {
        let dir = TempDir::new().unwrap();
        let err = build(&dir, json!({"result_type": "raw"})).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_result_type() {
        let dir = TempDir::new().unwrap();
        let err = build(&dir, json!({"script": "true", "result_type": "xml"})).err().unwrap();
        assert!(err.is_configuration());
    }
}
