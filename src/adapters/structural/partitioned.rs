//! Partitioned delivery
//!
//! Splits a table by the value of `partition_key` and builds one inner
//! result per group. Each inner result receives only its group's rows and
//! the group value as the `partition_group` template variable, so a file
//! result can write `sales_{partition_group}.csv`.
//!
//! With `partition_date_format` the key column is parsed as a date and the
//! group is the date rendered with that strftime format (`%Y-%m` groups by
//! month).

use super::ensure_leaf_inner;
use crate::adapters::traits::{decode_fields, AdapterContext, AdapterFields, Sink};
use crate::core::runner::FailurePolicy;
use crate::domain::{display_value, HarborError, ReportData, Result};
use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write;

/// Registered type name
pub const PARTITIONED_TYPE: &str = "partitioned";

/// Template variable holding the group value
pub const PARTITION_GROUP_VARIABLE: &str = "partition_group";

/// Fields of a `partitioned` result
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionedConfig {
    pub partition_key: String,

    #[serde(default)]
    pub partition_date_format: Option<String>,

    pub inner_result_type: String,

    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

/// One inner result per partition, saved in ascending group order
pub struct PartitionedSink {
    partitions: Vec<(String, Box<dyn Sink>)>,
    policy: FailurePolicy,
}

impl PartitionedSink {
    pub fn new(ctx: &AdapterContext, data: ReportData, fields: &AdapterFields) -> Result<Self> {
        let config: PartitionedConfig = decode_fields(PARTITIONED_TYPE, fields)?;
        ensure_leaf_inner(PARTITIONED_TYPE, &config.inner_result_type)?;

        let table = data.into_table("'partitioned' result")?;
        let date_format = config.partition_date_format.as_deref();
        if let Some(format) = date_format {
            validate_date_format(format)?;
        }
        let groups = table.partition(&config.partition_key, |value| {
            partition_key_of(value, date_format)
        })?;

        tracing::info!(
            partition_key = %config.partition_key,
            partitions = groups.len(),
            "Partitioned report data"
        );

        let mut partitions = Vec::with_capacity(groups.len());
        for (group, rows) in groups {
            let mut variables = config.variables.clone().unwrap_or_default();
            variables.insert(
                PARTITION_GROUP_VARIABLE.to_string(),
                Value::String(group.clone()),
            );

            let mut inner_fields = fields.clone();
            inner_fields.insert("variables".to_string(), Value::Object(variables));

            let sink = ctx.build_sink(&config.inner_result_type, rows.into(), &inner_fields)?;
            partitions.push((group, sink));
        }

        Ok(Self {
            partitions,
            policy: ctx.failure_policy(),
        })
    }

    /// Group values in save order
    pub fn groups(&self) -> Vec<&str> {
        self.partitions.iter().map(|(group, _)| group.as_str()).collect()
    }
}

#[async_trait]
impl Sink for PartitionedSink {
    async fn save(&mut self) -> Result<()> {
        let total = self.partitions.len();
        let mut failures = Vec::new();

        for (group, sink) in &mut self.partitions {
            match sink.save().await {
                Ok(()) => tracing::debug!(partition = %group, "Partition saved"),
                Err(e) => {
                    tracing::warn!(partition = %group, error = %e, "Partition failed");
                    if self.policy == FailurePolicy::Abort {
                        return Err(HarborError::Adapter(format!(
                            "Partition '{group}' failed: {e}"
                        )));
                    }
                    failures.push(format!("'{group}': {e}"));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(HarborError::Adapter(format!(
                "{} of {} partitions failed: {}",
                failures.len(),
                total,
                failures.join("; ")
            )))
        }
    }
}

/// Factory registered under `partitioned`
pub fn build_partitioned(
    ctx: &AdapterContext,
    data: ReportData,
    fields: &AdapterFields,
) -> Result<Box<dyn Sink>> {
    Ok(Box::new(PartitionedSink::new(ctx, data, fields)?))
}

// Rows whose key is null belong to no partition.
fn partition_key_of(value: &Value, date_format: Option<&str>) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    match date_format {
        None => Ok(Some(display_value(value))),
        Some(format) => {
            let date = parse_date(value)?;
            let mut group = String::new();
            // Specifiers that need a time zone fail on naive dates.
            write!(group, "{}", date.format(format)).map_err(|_| {
                HarborError::Adapter(format!(
                    "Cannot render partition value {value} with format '{format}'"
                ))
            })?;
            Ok(Some(group))
        }
    }
}

/// Rejects strftime patterns chrono cannot parse
fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(HarborError::Configuration(format!(
            "Invalid partition_date_format '{format}'"
        )));
    }
    Ok(())
}

/// Parses a partition cell as a date
///
/// Accepts RFC 3339 timestamps (rendered in their own offset),
/// `YYYY-MM-DD HH:MM:SS[.fff]`, the same with a `T` separator, and plain
/// `YYYY-MM-DD` dates.
fn parse_date(value: &Value) -> Result<NaiveDateTime> {
    let Some(text) = value.as_str() else {
        return Err(HarborError::Adapter(format!(
            "Partition value {value} is not a date string"
        )));
    };
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.naive_local());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| HarborError::Adapter(format!("Cannot parse partition value '{text}' as a date")))
}
