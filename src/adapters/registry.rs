//! Adapter registry
//!
//! Maps the `type` declared by a report or result to the factory that
//! builds it. The built-in adapters are registered by
//! [`AdapterRegistry::with_builtins`]; applications embedding Harbor add
//! their own with [`register_source`](AdapterRegistry::register_source) and
//! [`register_sink`](AdapterRegistry::register_sink) before running.

use super::traits::{AdapterContext, AdapterFields, Sink, SinkFactory, Source, SourceFactory};
use super::{command, file, structural};
use crate::domain::{AdapterKind, HarborError, ReportData, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of source and sink factories
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    sources: HashMap<String, SourceFactory>,
    sinks: HashMap<String, SinkFactory>,
}

impl AdapterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in adapters
    ///
    /// Sources: `file`, `bash`. Sinks: `file`, `fixed`, `partitioned`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_source(file::FILE_TYPE, file::build_source);
        registry.register_source(command::BASH_TYPE, command::build_source);
        registry.register_sink(file::FILE_TYPE, file::build_sink);
        registry.register_sink(structural::FIXED_TYPE, structural::build_fixed);
        registry.register_sink(structural::PARTITIONED_TYPE, structural::build_partitioned);
        registry
    }

    /// Registers a source factory
    ///
    /// A factory already registered under the same name is replaced.
    pub fn register_source<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&AdapterContext, &AdapterFields) -> Result<Box<dyn Source>> + Send + Sync + 'static,
    {
        self.sources.insert(type_name.into(), Arc::new(factory));
    }

    /// Registers a sink factory
    ///
    /// A factory already registered under the same name is replaced.
    pub fn register_sink<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&AdapterContext, ReportData, &AdapterFields) -> Result<Box<dyn Sink>>
            + Send
            + Sync
            + 'static,
    {
        self.sinks.insert(type_name.into(), Arc::new(factory));
    }

    /// Looks up a source factory
    ///
    /// # Errors
    ///
    /// Returns [`HarborError::UnknownAdapterType`] if nothing is registered
    /// under `type_name`.
    pub fn resolve_source(&self, type_name: &str) -> Result<SourceFactory> {
        self.sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| unknown(AdapterKind::Source, type_name))
    }

    /// Looks up a sink factory
    ///
    /// # Errors
    ///
    /// Returns [`HarborError::UnknownAdapterType`] if nothing is registered
    /// under `type_name`.
    pub fn resolve_sink(&self, type_name: &str) -> Result<SinkFactory> {
        self.sinks
            .get(type_name)
            .cloned()
            .ok_or_else(|| unknown(AdapterKind::Sink, type_name))
    }

    pub fn has_source(&self, type_name: &str) -> bool {
        self.sources.contains_key(type_name)
    }

    pub fn has_sink(&self, type_name: &str) -> bool {
        self.sinks.contains_key(type_name)
    }

    /// Registered source types, sorted
    pub fn source_types(&self) -> Vec<&str> {
        sorted_keys(&self.sources)
    }

    /// Registered sink types, sorted
    pub fn sink_types(&self) -> Vec<&str> {
        sorted_keys(&self.sinks)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("sources", &self.source_types())
            .field("sinks", &self.sink_types())
            .finish()
    }
}

fn unknown(kind: AdapterKind, type_name: &str) -> HarborError {
    HarborError::UnknownAdapterType {
        kind,
        type_name: type_name.to_string(),
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
