//! Domain models and types for Harbor.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Report data** ([`ReportData`], [`Table`]) passed from a report to its results
//! - **Error types** ([`HarborError`], [`TemplateError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, HarborError>`]:
//!
//! ```rust,no_run
//! use harbor::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = harbor::config::Config::from_file("config.json", None)?;
//!     println!("{} reports", config.report_names().len());
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use data::{display_value, ReportData, Table};
pub use errors::{AdapterKind, DeliveryFailure, DeliveryFailures, HarborError, TemplateError};
pub use result::Result;
