//! Configuration management for Harbor.
//!
//! # Overview
//!
//! A configuration is a JSON document (TOML is accepted for `.toml`
//! files) with three named collections and a few global settings:
//!
//! ```json
//! {
//!   "include": ["partials/ads.json"],
//!   "timezone": "America/Argentina/Buenos_Aires",
//!   "reports": [
//!     {
//!       "name": "daily_sales",
//!       "type": "file",
//!       "filename": "exports/sales_{y}{m}{d}.csv",
//!       "results": [
//!         {"type": "file", "filename": "out/sales_{y}{m-1d}.json"}
//!       ]
//!     }
//!   ],
//!   "connections": [{"name": "warehouse", "constring": "postgresql://..."}],
//!   "profiles": [{"name": "ads", "credentials": "secrets/ads.json"}]
//! }
//! ```
//!
//! - `include` lists partial configurations merged into this one
//! - `timezone`, `now` and `pwd` control the reference time and the base
//!   directory for relative paths
//! - profile credentials are read on first use, see [`CredentialProfile`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use harbor::config::Config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.json", None)?;
//! for name in config.report_names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod profile;
pub mod schema;
pub mod secret;
pub mod store;

// Re-export commonly used types
pub use loader::load_document;
pub use profile::{CredentialProfile, CREDENTIALS_ENV_PREFIX};
pub use schema::{
    ConfigDocument, ConnectionDefinition, LoggingConfig, ProfileDefinition, ReportDefinition,
    ResultDefinition,
};
pub use secret::{secret_string, SecretString, SecretValue};
pub use store::{Config, GLOBAL_FIELDS};
