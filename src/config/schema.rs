//! Configuration schema
//!
//! A configuration document lists reports, connections and profiles, each
//! identified by `name`. Apart from a handful of reserved keys every field is
//! free-form and belongs to the adapter that consumes it, so definitions keep
//! those fields in a JSON map rather than typed structs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One configuration file, before includes are merged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Paths of partial configurations merged into this one
    #[serde(default)]
    pub include: Vec<PathBuf>,

    #[serde(default)]
    pub reports: Vec<ReportDefinition>,

    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,

    #[serde(default)]
    pub profiles: Vec<ProfileDefinition>,

    /// IANA zone used to compute the reference time
    #[serde(default)]
    pub timezone: Option<String>,

    /// Base directory for relative paths
    #[serde(default)]
    pub pwd: Option<PathBuf>,

    /// Fixed reference time, `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub now: Option<String>,
}

/// A named report: one source adapter and the results fed by it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,

    /// Source adapter type
    #[serde(rename = "type")]
    pub report_type: String,

    #[serde(default)]
    pub results: Vec<ResultDefinition>,

    /// Adapter-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ReportDefinition {
    /// Fields handed to the source adapter
    ///
    /// Everything except `type` and `results`; `name` is included.
    pub fn adapter_fields(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields
    }

    /// Validates the definition
    ///
    /// # Errors
    ///
    /// Returns an error if the name or any declared type is empty
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("report name cannot be empty".to_string());
        }
        if self.report_type.trim().is_empty() {
            return Err(format!("report '{}' has an empty type", self.name));
        }
        for (index, result) in self.results.iter().enumerate() {
            if result.result_type.trim().is_empty() {
                return Err(format!(
                    "result #{index} of report '{}' has an empty type",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// A result (sink) attached to a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDefinition {
    /// Sink adapter type
    #[serde(rename = "type")]
    pub result_type: String,

    /// Adapter-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResultDefinition {
    /// Fields handed to the sink adapter (everything except `type`)
    pub fn adapter_fields(&self) -> Map<String, Value> {
        self.fields.clone()
    }
}

/// Named connection parameters shared by adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDefinition {
    pub name: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ConnectionDefinition {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Raw profile entry; see [`CredentialProfile`](super::CredentialProfile)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub name: String,

    /// Path to a file holding the credentials
    #[serde(default)]
    pub credentials: Option<PathBuf>,

    /// Environment variable holding the credentials
    #[serde(default)]
    pub env_variable: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Console-only logging
    pub fn console() -> Self {
        Self::default()
    }

    /// Console logging plus daily-rotated JSON files in `dir`
    pub fn with_directory(dir: impl Into<String>) -> Self {
        Self {
            local_enabled: true,
            local_path: dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
