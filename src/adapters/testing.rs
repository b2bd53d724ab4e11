//! Helpers shared by adapter unit tests

use super::registry::AdapterRegistry;
use super::traits::{AdapterContext, AdapterFields, Sink};
use crate::config::Config;
use crate::core::runner::FailurePolicy;
use crate::domain::{HarborError, ReportData, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub(crate) const TEST_NOW: &str = "2016-02-12 18:19:09";

pub(crate) fn config(dir: &Path) -> Config {
    Config::build(json!({"now": TEST_NOW}), Some(dir)).unwrap()
}

pub(crate) fn context(dir: &Path) -> AdapterContext {
    AdapterContext::new(
        Arc::new(config(dir)),
        Arc::new(AdapterRegistry::with_builtins()),
        FailurePolicy::Abort,
    )
}

/// Deliveries captured by the `record` sink
#[derive(Clone, Default)]
pub(crate) struct Recorded(Arc<Mutex<Vec<(ReportData, AdapterFields)>>>);

impl Recorded {
    pub(crate) fn take(&self) -> Vec<(ReportData, AdapterFields)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct RecordingSink {
    data: Option<ReportData>,
    fields: AdapterFields,
    recorded: Recorded,
}

#[async_trait]
impl Sink for RecordingSink {
    async fn save(&mut self) -> Result<()> {
        let group = self
            .fields
            .get("variables")
            .and_then(|v| v.get("partition_group"))
            .cloned();
        if group.is_some() && group.as_ref() == self.fields.get("fail_on") {
            return Err(HarborError::Adapter("recording sink told to fail".to_string()));
        }

        if let Some(data) = self.data.take() {
            self.recorded.0.lock().unwrap().push((data, self.fields.clone()));
        }
        Ok(())
    }
}

/// Builtins plus a `record` sink capturing its data and fields
///
/// The sink fails when its `fail_on` field equals the `partition_group`
/// variable it received.
pub(crate) fn recording_context_with_policy(
    dir: &Path,
    recorded: &Recorded,
    policy: FailurePolicy,
) -> AdapterContext {
    let mut registry = AdapterRegistry::with_builtins();
    let recorded = recorded.clone();
    registry.register_sink("record", move |_, data, fields| {
        Ok(Box::new(RecordingSink {
            data: Some(data),
            fields: fields.clone(),
            recorded: recorded.clone(),
        }) as Box<dyn Sink>)
    });

    AdapterContext::new(Arc::new(config(dir)), Arc::new(registry), policy)
}

pub(crate) fn recording_context(dir: &Path, recorded: &Recorded) -> AdapterContext {
    recording_context_with_policy(dir, recorded, FailurePolicy::Abort)
}

pub(crate) fn object(value: Value) -> AdapterFields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
