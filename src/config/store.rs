//! The merged configuration

use super::loader::{load_document, merge_includes};
use super::profile::CredentialProfile;
use super::schema::{ConfigDocument, ConnectionDefinition, ReportDefinition};
use crate::core::template::{self, FormatMode, TemplateFormatter};
use crate::domain::{HarborError, Result};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Global settings that invocation arguments may override
pub const GLOBAL_FIELDS: [&str; 3] = ["timezone", "now", "pwd"];

/// Reports, connections and profiles after include merging
///
/// Built once per invocation. Names are unique within each collection and
/// reports keep their declaration order.
#[derive(Debug)]
pub struct Config {
    base_dir: PathBuf,
    timezone: Option<String>,
    now: Option<String>,
    reports: Vec<ReportDefinition>,
    report_index: HashMap<String, usize>,
    connections: HashMap<String, ConnectionDefinition>,
    profiles: HashMap<String, CredentialProfile>,
}

impl Config {
    /// Loads a configuration file and its includes
    ///
    /// The base directory for relative paths is `working_directory` if
    /// given, else the document's `pwd`, else the process working directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unreadable or malformed files,
    /// include cycles, duplicate names, unknown time zones and malformed
    /// `now` overrides.
    pub fn from_file(path: impl AsRef<Path>, working_directory: Option<&Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading configuration");
        let document = load_document(path)?;
        Self::assemble(document, working_directory, Some(path))
    }

    /// Builds a configuration from an already parsed document
    pub fn from_document(document: ConfigDocument, working_directory: Option<&Path>) -> Result<Self> {
        Self::assemble(document, working_directory, None)
    }

    /// Builds a configuration from a JSON value
    pub fn build(value: Value, working_directory: Option<&Path>) -> Result<Self> {
        let document: ConfigDocument = serde_json::from_value(value)
            .map_err(|e| HarborError::Configuration(format!("Invalid configuration: {e}")))?;
        Self::from_document(document, working_directory)
    }

    fn assemble(
        mut document: ConfigDocument,
        working_directory: Option<&Path>,
        origin: Option<&Path>,
    ) -> Result<Self> {
        let base_dir = match (working_directory, document.pwd.take()) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(pwd)) => pwd,
            (None, None) => std::env::current_dir()?,
        };

        if let Some(tz) = &document.timezone {
            template::parse_timezone(tz)?;
        }
        if let Some(now) = &document.now {
            template::parse_now_override(now)?;
        }

        let timezone = document.timezone.take();
        let now = document.now.take();
        let merged = merge_includes(document, &base_dir, origin)?;

        let mut report_index = HashMap::with_capacity(merged.reports.len());
        for (position, report) in merged.reports.iter().enumerate() {
            report
                .validate()
                .map_err(|e| HarborError::Configuration(format!("Invalid report: {e}")))?;
            if report_index.insert(report.name.clone(), position).is_some() {
                return Err(duplicate("report", &report.name));
            }
        }

        let mut connections = HashMap::with_capacity(merged.connections.len());
        for connection in merged.connections {
            let name = connection.name.clone();
            if connections.insert(name.clone(), connection).is_some() {
                return Err(duplicate("connection", &name));
            }
        }

        let mut profiles = HashMap::with_capacity(merged.profiles.len());
        for definition in merged.profiles {
            let name = definition.name.clone();
            let profile = CredentialProfile::new(definition, &base_dir);
            if profiles.insert(name.clone(), profile).is_some() {
                return Err(duplicate("profile", &name));
            }
        }

        tracing::info!(
            reports = merged.reports.len(),
            connections = connections.len(),
            profiles = profiles.len(),
            base_dir = %base_dir.display(),
            "Configuration loaded"
        );

        Ok(Self {
            base_dir,
            timezone,
            now,
            reports: merged.reports,
            report_index,
            connections,
            profiles,
        })
    }

    /// Directory relative paths are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Joins a relative path to the base directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn now_override(&self) -> Option<&str> {
        self.now.as_deref()
    }

    /// Looks up a report by name
    pub fn report(&self, name: &str) -> Result<&ReportDefinition> {
        self.report_index
            .get(name)
            .map(|&position| &self.reports[position])
            .ok_or_else(|| HarborError::ReportNotFound(name.to_string()))
    }

    /// Reports in declaration order
    pub fn reports(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.reports.iter()
    }

    /// Report names in declaration order
    pub fn report_names(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn connection(&self, name: &str) -> Result<&ConnectionDefinition> {
        self.connections
            .get(name)
            .ok_or_else(|| HarborError::Configuration(format!("Connection '{name}' not found")))
    }

    pub fn profile(&self, name: &str) -> Result<&CredentialProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| HarborError::Configuration(format!("Profile '{name}' not found")))
    }

    /// Applies `timezone`, `now` and `pwd` from invocation arguments
    ///
    /// Keys that are absent leave the current value untouched.
    pub fn overwrite_globals(&mut self, extra: &Map<String, Value>) -> Result<()> {
        if let Some(value) = extra.get("timezone") {
            let tz = global_string("timezone", value)?;
            template::parse_timezone(&tz)?;
            self.timezone = Some(tz);
        }
        if let Some(value) = extra.get("now") {
            let now = global_string("now", value)?;
            template::parse_now_override(&now)?;
            self.now = Some(now);
        }
        if let Some(value) = extra.get("pwd") {
            let pwd = global_string("pwd", value)?;
            self.base_dir = self.resolve_path(pwd);
        }
        Ok(())
    }

    /// The instant template keys are evaluated against
    pub fn reference_time(&self) -> Result<NaiveDateTime> {
        template::reference_time(self.timezone(), self.now_override())
    }

    /// A formatter bound to the current reference time
    pub fn formatter(
        &self,
        mode: FormatMode,
        variables: Option<&Map<String, Value>>,
    ) -> Result<TemplateFormatter> {
        let formatter = TemplateFormatter::new(self.reference_time()?, mode);
        Ok(match variables {
            Some(vars) => formatter.with_variables(vars.clone()),
            None => formatter,
        })
    }
}

fn duplicate(collection: &str, name: &str) -> HarborError {
    HarborError::Configuration(format!("Duplicate {collection} name '{name}'"))
}

fn global_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(HarborError::Configuration(format!(
            "Global setting '{key}' must be a string, got {other}"
        ))),
    }
}
