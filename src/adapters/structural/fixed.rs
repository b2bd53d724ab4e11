//! Fixed column set

use super::ensure_leaf_inner;
use crate::adapters::traits::{decode_fields, AdapterContext, AdapterFields, Sink};
use crate::domain::{ReportData, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Registered type name
pub const FIXED_TYPE: &str = "fixed";

/// Fields of a `fixed` result
#[derive(Debug, Clone, Deserialize)]
pub struct FixedColumnsConfig {
    /// Output columns, in order
    pub columns: Vec<String>,

    /// Fill value for columns missing from the data
    #[serde(default)]
    pub default_value: Value,

    pub inner_result_type: String,
}

/// Delivers exactly `columns` through an inner result
///
/// Missing columns are added and filled with `default_value`; columns not
/// listed are dropped.
pub struct FixedColumnsSink {
    inner: Box<dyn Sink>,
}

impl FixedColumnsSink {
    pub fn new(ctx: &AdapterContext, data: ReportData, fields: &AdapterFields) -> Result<Self> {
        let config: FixedColumnsConfig = decode_fields(FIXED_TYPE, fields)?;
        ensure_leaf_inner(FIXED_TYPE, &config.inner_result_type)?;

        let table = data.into_table("'fixed' result")?;
        let projected = table.project(&config.columns, &config.default_value);
        tracing::debug!(
            columns = ?config.columns,
            inner = %config.inner_result_type,
            "Projected data onto fixed columns"
        );

        let inner = ctx.build_sink(&config.inner_result_type, projected.into(), fields)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Sink for FixedColumnsSink {
    async fn save(&mut self) -> Result<()> {
        self.inner.save().await
    }
}

/// Factory registered under `fixed`
pub fn build_fixed(
    ctx: &AdapterContext,
    data: ReportData,
    fields: &AdapterFields,
) -> Result<Box<dyn Sink>> {
    Ok(Box::new(FixedColumnsSink::new(ctx, data, fields)?))
}
