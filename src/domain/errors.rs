//! Domain error types
//!
//! This module defines the error hierarchy for Harbor. Adapter internals
//! (file system, CSV, JSON, child processes) are converted into these
//! variants at the adapter boundary so callers see one error surface no
//! matter which adapter failed.

use std::fmt;
use thiserror::Error;

/// Main Harbor error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum HarborError {
    /// Malformed or unreadable configuration, include file or adapter fields
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A report or result declares a type absent from the registry
    #[error("Unknown {kind} type '{type_name}'")]
    UnknownAdapterType {
        /// Whether the source or the sink registry was consulted
        kind: AdapterKind,
        /// The declared type name
        type_name: String,
    },

    /// Requested report name absent from the merged configuration
    #[error("Report '{0}' not found")]
    ReportNotFound(String),

    /// A profile's credential file or environment variable is unavailable
    #[error("Missing credentials for profile '{profile}': {reason}")]
    MissingCredential {
        /// Profile name
        profile: String,
        /// What was looked up and why it failed
        reason: String,
    },

    /// The source adapter failed while producing data
    #[error("Report '{report}' failed: {message}")]
    ReportExecution {
        /// Report name
        report: String,
        /// Underlying cause
        message: String,
    },

    /// One or more sink adapters failed while delivering data
    #[error("Report '{report}' failed to deliver {failures}")]
    ResultExecution {
        /// Report name
        report: String,
        /// Every failed delivery, in declared order
        failures: DeliveryFailures,
    },

    /// Template evaluation errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Errors raised inside an adapter
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Which registry an adapter type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Source adapters (reports)
    Source,
    /// Sink adapters (results)
    Sink,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Source => write!(f, "report"),
            AdapterKind::Sink => write!(f, "result"),
        }
    }
}

/// Template DSL errors
///
/// Unknown anchors never produce an error; they are left in the output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Offset quantity is not an integer
    #[error("Invalid offset quantity in '{{{key}}}'")]
    InvalidQuantity {
        /// The full template key
        key: String,
    },

    /// Offset unit letter is missing or unknown
    #[error("Unknown offset unit in '{{{key}}}'")]
    UnknownUnit {
        /// The full template key
        key: String,
    },

    /// Date arithmetic left the representable range
    #[error("Date out of range while evaluating '{{{key}}}'")]
    OutOfRange {
        /// The full template key
        key: String,
    },
}

/// Details of a single failed result delivery
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// Position of the result in the report's `results` list
    pub index: usize,

    /// Declared result type
    pub result_type: String,

    /// Error message
    pub message: String,
}

impl DeliveryFailure {
    /// Creates a new delivery failure
    pub fn new(index: usize, result_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            index,
            result_type: result_type.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}): {}", self.index, self.result_type, self.message)
    }
}

/// The failed deliveries of one report
#[derive(Debug, Clone, Default)]
pub struct DeliveryFailures(Vec<DeliveryFailure>);

impl DeliveryFailures {
    /// Number of failed deliveries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records a failure
    pub fn push(&mut self, failure: DeliveryFailure) {
        self.0.push(failure);
    }

    /// Iterates over the failures in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, DeliveryFailure> {
        self.0.iter()
    }
}

impl From<Vec<DeliveryFailure>> for DeliveryFailures {
    fn from(failures: Vec<DeliveryFailure>) -> Self {
        Self(failures)
    }
}

impl fmt::Display for DeliveryFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} result(s): ", self.0.len())?;
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl HarborError {
    /// Whether the error was raised while loading configuration, before
    /// any report ran. The CLI maps these to a distinct exit code.
    pub fn is_configuration(&self) -> bool {
        matches!(self, HarborError::Configuration(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HarborError {
    fn from(err: std::io::Error) -> Self {
        HarborError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HarborError {
    fn from(err: serde_json::Error) -> Self {
        HarborError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HarborError {
    fn from(err: toml::de::Error) -> Self {
        HarborError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for HarborError {
    fn from(err: csv::Error) -> Self {
        HarborError::Serialization(format!("CSV error: {err}"))
    }
}
