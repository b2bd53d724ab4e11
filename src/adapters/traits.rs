//! Adapter traits
//!
//! Reports are produced by a [`Source`] and delivered by one or more
//! [`Sink`]s. Adapters are built from their configuration fields by factory
//! closures held in the [`AdapterRegistry`](super::AdapterRegistry); they
//! live for a single run.

use super::registry::AdapterRegistry;
use crate::config::Config;
use crate::core::runner::FailurePolicy;
use crate::core::template::{FormatMode, TemplateFormatter};
use crate::domain::{HarborError, ReportData, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration fields of one report or result, extra arguments merged in
pub type AdapterFields = Map<String, Value>;

/// Builds a source from its fields
pub type SourceFactory =
    Arc<dyn Fn(&AdapterContext, &AdapterFields) -> Result<Box<dyn Source>> + Send + Sync>;

/// Builds a sink from its fields and the data it should deliver
pub type SinkFactory = Arc<
    dyn Fn(&AdapterContext, ReportData, &AdapterFields) -> Result<Box<dyn Sink>> + Send + Sync,
>;

/// Produces the data of a report
#[async_trait]
pub trait Source: Send {
    /// Runs the source
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be fetched or parsed.
    async fn process(&mut self) -> Result<ReportData>;
}

/// Delivers report data somewhere
///
/// Construction must not have side effects; everything happens in `save`.
#[async_trait]
pub trait Sink: Send {
    /// Delivers the data
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery fails.
    async fn save(&mut self) -> Result<()>;
}

/// Shared state handed to every factory
#[derive(Clone)]
pub struct AdapterContext {
    config: Arc<Config>,
    registry: Arc<AdapterRegistry>,
    failure_policy: FailurePolicy,
}

impl AdapterContext {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<AdapterRegistry>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            config,
            registry,
            failure_policy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registry used by wrappers to build their inner sinks
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Joins a relative path to the configuration's base directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.config.resolve_path(path)
    }

    /// A formatter bound to the configuration's reference time
    pub fn formatter(
        &self,
        mode: FormatMode,
        variables: Option<&Map<String, Value>>,
    ) -> Result<TemplateFormatter> {
        self.config.formatter(mode, variables)
    }

    /// Builds a sink through the registry
    pub fn build_sink(
        &self,
        result_type: &str,
        data: ReportData,
        fields: &AdapterFields,
    ) -> Result<Box<dyn Sink>> {
        let factory = self.registry.resolve_sink(result_type)?;
        factory(self, data, fields)
    }
}

impl std::fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterContext")
            .field("base_dir", &self.config.base_dir())
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

/// Decodes adapter fields into a typed configuration struct
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns a configuration error naming the adapter when a required field
/// is missing or has the wrong type.
pub fn decode_fields<T: DeserializeOwned>(adapter: &str, fields: &AdapterFields) -> Result<T> {
    serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| HarborError::Configuration(format!("Invalid '{adapter}' fields: {e}")))
}
