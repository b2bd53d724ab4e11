//! Logging and observability
//!
//! Structured logging through `tracing`: human-readable console output and
//! optional JSON files with rotation.
//!
//! # Example
//!
//! ```no_run
//! use harbor::logging::init_logging;
//! use harbor::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard, LOG_FILE_NAME};

/// Log the start of a report run
///
/// # Example
///
/// ```no_run
/// use harbor::log_report_start;
///
/// log_report_start!("daily_sales", "file");
/// ```
#[macro_export]
macro_rules! log_report_start {
    ($report:expr, $report_type:expr) => {
        tracing::info!(
            report = %$report,
            report_type = %$report_type,
            "Running report"
        );
    };
}

/// Log a saved result
///
/// # Example
///
/// ```no_run
/// use harbor::log_result_saved;
///
/// log_result_saved!("daily_sales", 0, "file");
/// ```
#[macro_export]
macro_rules! log_result_saved {
    ($report:expr, $index:expr, $result_type:expr) => {
        tracing::info!(
            report = %$report,
            index = $index,
            result_type = %$result_type,
            "Result saved"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use harbor::log_error_with_context;
/// use harbor::domain::HarborError;
///
/// let error = HarborError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
