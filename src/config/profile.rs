//! Credential profiles
//!
//! A profile names the place its credentials live: a file (`credentials`)
//! or an environment variable (`env_variable`, by default
//! `HARBOR_CREDENTIALS_<NAME>`). Nothing is read while the configuration is
//! loaded; the first call to [`CredentialProfile::credentials`] reads the
//! value and caches it for the lifetime of the profile.

use super::schema::ProfileDefinition;
use super::secret::{secret_string, SecretString};
use crate::domain::{HarborError, Result};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Prefix of the default credentials environment variable
pub const CREDENTIALS_ENV_PREFIX: &str = "HARBOR_CREDENTIALS_";

/// A profile with lazily resolved credentials
#[derive(Debug)]
pub struct CredentialProfile {
    name: String,
    credentials_file: Option<PathBuf>,
    env_variable: Option<String>,
    fields: Map<String, Value>,
    resolved: OnceLock<SecretString>,
}

impl CredentialProfile {
    /// Builds a profile; relative credential paths are joined to `base_dir`
    pub fn new(definition: ProfileDefinition, base_dir: &Path) -> Self {
        let credentials_file = definition.credentials.map(|path| {
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        });

        Self {
            name: definition.name,
            credentials_file,
            env_variable: definition.env_variable,
            fields: definition.fields,
            resolved: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Environment variable consulted when no credentials file is set
    pub fn env_variable_name(&self) -> String {
        match &self.env_variable {
            Some(var) => var.clone(),
            None => format!("{CREDENTIALS_ENV_PREFIX}{}", self.name).to_uppercase(),
        }
    }

    /// Returns the credentials, reading them on first access
    ///
    /// # Errors
    ///
    /// Returns [`HarborError::MissingCredential`] if the file cannot be read
    /// or the environment variable is not set. A failed lookup is not cached.
    pub fn credentials(&self) -> Result<&SecretString> {
        if let Some(secret) = self.resolved.get() {
            return Ok(secret);
        }

        let secret = self.fetch()?;
        Ok(self.resolved.get_or_init(|| secret))
    }

    /// Parses the credentials as a JSON object
    pub fn json_credentials(&self) -> Result<Map<String, Value>> {
        let secret = self.credentials()?;
        serde_json::from_str(secret.expose_secret().as_str()).map_err(|e| {
            HarborError::MissingCredential {
                profile: self.name.clone(),
                reason: format!("credentials are not a JSON object: {e}"),
            }
        })
    }

    /// True once credentials have been read
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Other profile attributes, verbatim
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn fetch(&self) -> Result<SecretString> {
        if let Some(path) = &self.credentials_file {
            tracing::debug!(profile = %self.name, path = %path.display(), "Reading credentials file");
            let contents =
                std::fs::read_to_string(path).map_err(|e| HarborError::MissingCredential {
                    profile: self.name.clone(),
                    reason: format!("cannot read {}: {e}", path.display()),
                })?;
            return Ok(secret_string(contents));
        }

        let var = self.env_variable_name();
        tracing::debug!(profile = %self.name, env_variable = %var, "Reading credentials from environment");
        std::env::var(&var)
            .map(secret_string)
            .map_err(|e| HarborError::MissingCredential {
                profile: self.name.clone(),
                reason: format!("environment variable {var}: {e}"),
            })
    }
}
