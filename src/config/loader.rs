//! Configuration loader
//!
//! Reads JSON (or TOML, for `.toml` files) configuration documents and
//! merges their `include` trees. Collections are concatenated depth first:
//! for `root -> A -> B` the merged list holds B's items, then A's, then the
//! root's own.

use super::schema::{ConfigDocument, ConnectionDefinition, ProfileDefinition, ReportDefinition};
use crate::domain::errors::HarborError;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Collections gathered from a document and everything it includes
#[derive(Debug, Default)]
pub struct MergedCollections {
    pub reports: Vec<ReportDefinition>,
    pub connections: Vec<ConnectionDefinition>,
    pub profiles: Vec<ProfileDefinition>,
}

impl MergedCollections {
    fn append(&mut self, mut other: MergedCollections) {
        self.reports.append(&mut other.reports);
        self.connections.append(&mut other.connections);
        self.profiles.append(&mut other.profiles);
    }
}

/// Loads a single configuration document without resolving includes
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or malformed
pub fn load_document(path: impl AsRef<Path>) -> Result<ConfigDocument> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HarborError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HarborError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_document(&contents, path)
}

fn parse_document(contents: &str, path: &Path) -> Result<ConfigDocument> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(contents).map_err(|e| {
            HarborError::Configuration(format!("Failed to parse TOML {}: {}", path.display(), e))
        })
    } else {
        serde_json::from_str(contents).map_err(|e| {
            HarborError::Configuration(format!("Failed to parse JSON {}: {}", path.display(), e))
        })
    }
}

/// Merges `document` with its include tree
///
/// Relative include paths are resolved against `base_dir`. `origin` is the
/// file the document came from, if any, and takes part in cycle detection.
pub fn merge_includes(
    document: ConfigDocument,
    base_dir: &Path,
    origin: Option<&Path>,
) -> Result<MergedCollections> {
    let mut stack = Vec::new();
    if let Some(path) = origin {
        stack.push(canonical(path));
    }
    collect(document, base_dir, &mut stack)
}

fn collect(
    document: ConfigDocument,
    base_dir: &Path,
    stack: &mut Vec<PathBuf>,
) -> Result<MergedCollections> {
    let mut merged = MergedCollections::default();

    for include in &document.include {
        let path = if include.is_absolute() {
            include.clone()
        } else {
            base_dir.join(include)
        };
        let key = canonical(&path);

        if stack.contains(&key) {
            return Err(HarborError::Configuration(format!(
                "Include cycle detected at {}",
                path.display()
            )));
        }

        tracing::debug!(include = %path.display(), "Loading included configuration");
        let partial = load_document(&path)?;

        stack.push(key);
        let nested = collect(partial, base_dir, stack)?;
        stack.pop();

        merged.append(nested);
    }

    merged.append(MergedCollections {
        reports: document.reports,
        connections: document.connections,
        profiles: document.profiles,
    });

    Ok(merged)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
