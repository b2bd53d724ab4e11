//! Reference time resolution
//!
//! Template keys are evaluated against the wall-clock time of the configured
//! IANA zone (UTC when none is configured). A fixed `now` override pins that
//! wall-clock time for reproducible runs and backfills.

use crate::domain::{HarborError, Result};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Format of the `now` override and of ISO-mode template output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses an IANA zone name
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| HarborError::Configuration(format!("Unknown timezone '{name}': {e}")))
}

/// Parses a `YYYY-MM-DD HH:MM:SS` override
pub fn parse_now_override(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        HarborError::Configuration(format!(
            "Invalid 'now' override '{value}' (expected YYYY-MM-DD HH:MM:SS): {e}"
        ))
    })
}

/// Resolves the reference time as a local wall-clock instant
///
/// The override, when present, is already a wall-clock time in the
/// configured zone and is returned as is.
pub fn reference_time(timezone: Option<&str>, now_override: Option<&str>) -> Result<NaiveDateTime> {
    let zone = match timezone {
        Some(name) => parse_timezone(name)?,
        None => Tz::UTC,
    };

    match now_override {
        Some(value) => parse_now_override(value),
        None => Ok(Utc::now().with_timezone(&zone).naive_local()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let now = reference_time(Some("America/Argentina/Buenos_Aires"), Some("2016-02-12 18:19:09"))
            .unwrap();
        assert_eq!(now.to_string(), "2016-02-12 18:19:09");
    }

    #[test]
    fn test_invalid_override() {
        let err = reference_time(None, Some("12/02/2016")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_timezone() {
        let err = reference_time(Some("Mars/Olympus_Mons"), None).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_zone_offset_applied() {
        let utc = reference_time(None, None).unwrap();
        let tokyo = reference_time(Some("Asia/Tokyo"), None).unwrap();
        let diff = (tokyo - utc).num_minutes();
        // Tokyo has no DST; allow for the clock ticking between calls
        assert!((539..=541).contains(&diff), "unexpected offset {diff}");
    }
}
