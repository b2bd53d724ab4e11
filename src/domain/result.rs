//! Result type alias for Harbor
//!
//! This module provides a convenient Result type alias that uses HarborError
//! as the error type.

use super::errors::HarborError;

/// Result type alias for Harbor operations
///
/// # Examples
///
/// ```
/// use harbor::domain::result::Result;
/// use harbor::domain::errors::HarborError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HarborError::ReportNotFound("weekly".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HarborError>;
