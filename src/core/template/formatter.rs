//! Template formatter
//!
//! Replaces `{key}` fields in a string. Variables are substituted first,
//! then every field whose anchor is a date anchor is evaluated against the
//! reference time. Fields with unknown anchors are left as written, and
//! `{{` / `}}` produce literal braces.

use super::clock::TIMESTAMP_FORMAT;
use super::key::TemplateKey;
use crate::domain::{display_value, TemplateError};
use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// How resolved dates are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// `YYYY-MM-DD HH:MM:SS` for every key (queries, scripts, parameters)
    #[default]
    Iso,
    /// strftime key chosen by each field's anchor letter (file names)
    Filename,
}

/// Evaluates the relative-date template language
///
/// # Example
///
/// ```
/// use harbor::core::template::{FormatMode, TemplateFormatter};
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2016, 2, 12)
///     .unwrap()
///     .and_hms_opt(18, 19, 9)
///     .unwrap();
///
/// let iso = TemplateFormatter::new(now, FormatMode::Iso);
/// assert_eq!(iso.format("{t-1d}").unwrap(), "2016-02-11 00:00:00");
///
/// let files = TemplateFormatter::new(now, FormatMode::Filename);
/// assert_eq!(files.format("sales_{y}{m}{d}.csv").unwrap(), "sales_20160212.csv");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    reference: NaiveDateTime,
    mode: FormatMode,
    variables: Map<String, Value>,
}

impl TemplateFormatter {
    pub fn new(reference: NaiveDateTime, mode: FormatMode) -> Self {
        Self {
            reference,
            mode,
            variables: Map::new(),
        }
    }

    /// Adds variables substituted before date keys are evaluated
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    pub fn mode(&self) -> FormatMode {
        self.mode
    }

    /// Formats a template
    ///
    /// # Errors
    ///
    /// Returns an error when a date key has a malformed offset or the
    /// arithmetic leaves the supported date range.
    pub fn format(&self, template: &str) -> Result<String, TemplateError> {
        let template = self.apply_variables(template);

        let mut failure = None;
        let rendered = field_pattern().replace_all(&template, |caps: &Captures<'_>| {
            let Some(key) = caps.get(1) else {
                return unescape(&caps[0]).to_string();
            };
            match self.render_key(key.as_str()) {
                Ok(Some(value)) => value,
                Ok(None) => caps[0].to_string(),
                Err(e) => {
                    failure.get_or_insert(e);
                    String::new()
                }
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(rendered.into_owned()),
        }
    }

    fn apply_variables(&self, template: &str) -> String {
        if self.variables.is_empty() {
            return template.to_string();
        }

        field_pattern()
            .replace_all(template, |caps: &Captures<'_>| {
                caps.get(1)
                    .and_then(|key| self.variables.get(key.as_str()))
                    .map(display_value)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn render_key(&self, key: &str) -> Result<Option<String>, TemplateError> {
        let Some(parsed) = TemplateKey::parse(key)? else {
            return Ok(None);
        };
        let instant = parsed.resolve(self.reference)?;

        let pattern = match self.mode {
            FormatMode::Iso => TIMESTAMP_FORMAT,
            FormatMode::Filename => parsed.filename_pattern().unwrap_or(TIMESTAMP_FORMAT),
        };
        Ok(Some(instant.format(pattern).to_string()))
    }
}

/// Formats an ISO-mode template in one call
pub fn format_template(
    template: &str,
    reference: NaiveDateTime,
    variables: Option<&Map<String, Value>>,
) -> Result<String, TemplateError> {
    let mut formatter = TemplateFormatter::new(reference, FormatMode::Iso);
    if let Some(vars) = variables {
        formatter = formatter.with_variables(vars.clone());
    }
    formatter.format(template)
}

// Matches escaped braces or a `{field}` without nested braces.
fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("valid field pattern"))
}

fn unescape(escaped: &str) -> &str {
    match escaped {
        "{{" => "{",
        "}}" => "}",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 2, 12)
            .unwrap()
            .and_hms_opt(18, 19, 9)
            .unwrap()
    }

    fn iso() -> TemplateFormatter {
        TemplateFormatter::new(reference(), FormatMode::Iso)
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(iso().format("foo bar baz!!1").unwrap(), "foo bar baz!!1");
    }

    #[test]
    fn test_several_keys_in_one_template() {
        let out = iso()
            .format("SELECT * FROM t WHERE ts >= '{t-1d}' AND ts < '{t}'")
            .unwrap();
        assert_eq!(
            out,
            "SELECT * FROM t WHERE ts >= '2016-02-11 00:00:00' AND ts < '2016-02-12 00:00:00'"
        );
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        assert_eq!(iso().format("{q}-{t}").unwrap(), "{q}-2016-02-12 00:00:00");
        assert_eq!(iso().format("{foo}").unwrap(), "{foo}");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(iso().format("{{t}}").unwrap(), "{t}");
    }

    #[test]
    fn test_stray_brace_is_literal() {
        assert_eq!(iso().format("a { b").unwrap(), "a { b");
    }

    #[test]
    fn test_malformed_offset_fails() {
        assert!(iso().format("{t-1x}").is_err());
        assert!(iso().format("{now-onex}").is_err());
    }

    #[test]
    fn test_variables_substituted_first() {
        let vars = json!({"foo": "bar", "yesterday": "{t-1d}", "n": 3})
            .as_object()
            .unwrap()
            .clone();
        let formatter = iso().with_variables(vars);

        assert_eq!(formatter.format("{foo}").unwrap(), "bar");
        assert_eq!(formatter.format("{yesterday}").unwrap(), "2016-02-11 00:00:00");
        assert_eq!(formatter.format("{n}/{missing}").unwrap(), "3/{missing}");
    }

    #[test]
    fn test_filename_mode_per_key_format() {
        let files = TemplateFormatter::new(reference(), FormatMode::Filename);
        assert_eq!(files.format("{y}-{m}-{d}").unwrap(), "2016-02-12");
        assert_eq!(files.format("{y}_{m-1d}").unwrap(), "2016_02");
        assert_eq!(files.format("{a} {A}").unwrap(), "Fri Friday");
        assert_eq!(files.format("{t}").unwrap(), "2016-02-12 00:00:00");
    }

    #[test]
    fn test_format_template_helper() {
        let vars = json!({"day": "{t}"}).as_object().unwrap().clone();
        assert_eq!(
            format_template("{day}", reference(), Some(&vars)).unwrap(),
            "2016-02-12 00:00:00"
        );
        assert_eq!(
            format_template("{now-1d}", reference(), None).unwrap(),
            "2016-02-11 18:19:09"
        );
    }
}
