//! Reads a report from a file

use super::codec::{self, TabularFormat};
use crate::adapters::traits::{decode_fields, AdapterContext, AdapterFields, Source};
use crate::core::template::FormatMode;
use crate::domain::{HarborError, ReportData, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Fields of a `file` report
#[derive(Debug, Clone, Deserialize)]
pub struct FileSourceConfig {
    /// Path template, rendered in filename mode
    pub filename: String,

    /// Return the bytes unparsed
    #[serde(default)]
    pub raw: bool,

    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

/// Source reading a CSV, TSV or JSON file, or any file when raw
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    format: Option<TabularFormat>,
    raw: bool,
}

impl FileSource {
    pub fn new(ctx: &AdapterContext, config: FileSourceConfig) -> Result<Self> {
        let filename = ctx
            .formatter(FormatMode::Filename, config.variables.as_ref())?
            .format(&config.filename)?;
        let path = ctx.resolve_path(&filename);
        let format = TabularFormat::from_path(&path);

        if format.is_none() && !config.raw {
            return Err(HarborError::Configuration(format!(
                "Unknown file type for '{filename}'; set \"raw\": true to read it unparsed"
            )));
        }

        Ok(Self {
            path,
            format,
            raw: config.raw,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl Source for FileSource {
    async fn process(&mut self) -> Result<ReportData> {
        tracing::info!(path = %self.path.display(), raw = self.raw, "Reading file");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            HarborError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        match (self.raw, self.format) {
            (false, Some(format)) => Ok(ReportData::Table(codec::decode(&bytes, format)?)),
            _ => Ok(ReportData::Raw(bytes)),
        }
    }
}

/// Factory registered under `file`
pub fn build_source(ctx: &AdapterContext, fields: &AdapterFields) -> Result<Box<dyn Source>> {
    let config: FileSourceConfig = decode_fields(super::FILE_TYPE, fields)?;
    Ok(Box::new(FileSource::new(ctx, config)?))
}
