//! Writes report data to a file

use super::codec::{self, TabularFormat};
use crate::adapters::traits::{decode_fields, AdapterContext, AdapterFields, Sink};
use crate::core::template::FormatMode;
use crate::domain::{HarborError, ReportData, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Fields of a `file` result
#[derive(Debug, Clone, Deserialize)]
pub struct FileSinkConfig {
    /// Path template, rendered in filename mode
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Write a header row for CSV and TSV output
    #[serde(default = "default_header")]
    pub header: bool,

    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

fn default_filename() -> String {
    "output.csv".to_string()
}

fn default_header() -> bool {
    true
}

/// Sink writing a table (or raw bytes) to disk
///
/// Tables are written as TSV or JSON when the extension says so, and as
/// CSV otherwise. Raw data is written verbatim.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    data: ReportData,
    header: bool,
}

impl FileSink {
    pub fn new(ctx: &AdapterContext, data: ReportData, config: FileSinkConfig) -> Result<Self> {
        let filename = ctx
            .formatter(FormatMode::Filename, config.variables.as_ref())?
            .format(&config.filename)?;

        Ok(Self {
            path: ctx.resolve_path(filename),
            data,
            header: config.header,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn contents(&self) -> Result<Vec<u8>> {
        match &self.data {
            ReportData::Raw(bytes) => Ok(bytes.clone()),
            ReportData::Table(table) => {
                let format = TabularFormat::from_path(&self.path).unwrap_or(TabularFormat::Csv);
                codec::encode(table, format, self.header)
            }
        }
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn save(&mut self) -> Result<()> {
        tracing::info!(path = %self.path.display(), "Writing result to file");
        let contents = self.contents()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    HarborError::Io(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            HarborError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// Factory registered under `file`
pub fn build_sink(
    ctx: &AdapterContext,
    data: ReportData,
    fields: &AdapterFields,
) -> Result<Box<dyn Sink>> {
    let config: FileSinkConfig = decode_fields(super::FILE_TYPE, fields)?;
    Ok(Box::new(FileSink::new(ctx, data, config)?))
}
