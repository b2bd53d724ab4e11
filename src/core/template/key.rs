//! Template key grammar and date arithmetic
//!
//! A key is `<anchor>[<sign><quantity><unit>]`, for example `t`, `now-1d`
//! or `m+3w`. The offset is applied to the anchor's base instant first and
//! the anchor's truncation afterwards, so `{m-1d}` on the 12th stays in the
//! current month while `{m-12d}` moves to the previous one.

use crate::domain::TemplateError;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Truncation level selected by the anchor letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// `now`, `a`, `A`
    Now,
    /// `t`, `T`, `d`, `D`
    Day,
    /// `m`
    Month,
    /// `y`, `Y`
    Year,
    /// `h`, `H`
    Hour,
    /// `M`
    Minute,
    /// `w`, `W`: Monday at midnight, on or before the reference date
    Week,
}

impl Anchor {
    fn from_token(token: &str) -> Option<Self> {
        let anchor = match token {
            "now" | "a" | "A" => Anchor::Now,
            "t" | "T" | "d" | "D" => Anchor::Day,
            "m" => Anchor::Month,
            "y" | "Y" => Anchor::Year,
            "h" | "H" => Anchor::Hour,
            "M" => Anchor::Minute,
            "w" | "W" => Anchor::Week,
            _ => return None,
        };
        Some(anchor)
    }

    fn base(self, reference: NaiveDateTime) -> NaiveDateTime {
        match self {
            Anchor::Week => {
                let back = i64::from(reference.weekday().num_days_from_monday());
                (reference.date() - Duration::days(back)).and_time(NaiveTime::MIN)
            }
            _ => reference,
        }
    }

    fn truncate(self, value: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Anchor::Now | Anchor::Week => Some(value),
            Anchor::Day => Some(value.date().and_time(NaiveTime::MIN)),
            Anchor::Month => NaiveDate::from_ymd_opt(value.year(), value.month(), 1)
                .map(|d| d.and_time(NaiveTime::MIN)),
            Anchor::Year => {
                NaiveDate::from_ymd_opt(value.year(), 1, 1).map(|d| d.and_time(NaiveTime::MIN))
            }
            Anchor::Hour => value.date().and_hms_opt(value.hour(), 0, 0),
            Anchor::Minute => value.date().and_hms_opt(value.hour(), value.minute(), 0),
        }
    }
}

/// Offset unit letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Weeks,
    /// `f`: jump to the n-th Monday relative to the instant
    Monday,
}

impl Unit {
    fn from_char(c: char) -> Option<Self> {
        let unit = match c {
            'y' => Unit::Years,
            'm' => Unit::Months,
            'd' => Unit::Days,
            'h' => Unit::Hours,
            'M' => Unit::Minutes,
            'w' => Unit::Weeks,
            'f' => Unit::Monday,
            _ => return None,
        };
        Some(unit)
    }
}

/// A parsed template key
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateKey {
    /// Anchor text as written, selects the filename render format
    pub(crate) token: String,
    pub(crate) anchor: Anchor,
    pub(crate) offset: Option<(i64, Unit)>,
}

impl TemplateKey {
    /// Parses a key
    ///
    /// Returns `Ok(None)` when the anchor is not a date anchor; such keys
    /// stay in the output untouched. A recognised anchor with a malformed
    /// offset is an error.
    pub(crate) fn parse(key: &str) -> Result<Option<Self>, TemplateError> {
        let sign = if key.contains('-') { '-' } else { '+' };
        let mut parts = key.split(sign);
        let token = parts.next().unwrap_or_default().trim();

        let Some(anchor) = Anchor::from_token(token) else {
            return Ok(None);
        };

        let offset = match parts.next() {
            None => None,
            Some(modifier) => {
                if parts.next().is_some() {
                    return Err(TemplateError::InvalidQuantity {
                        key: key.to_string(),
                    });
                }
                Some(parse_offset(key, sign, modifier.trim())?)
            }
        };

        Ok(Some(Self {
            token: token.to_string(),
            anchor,
            offset,
        }))
    }

    /// Resolves the key against a reference time
    pub(crate) fn resolve(&self, reference: NaiveDateTime) -> Result<NaiveDateTime, TemplateError> {
        let out_of_range = || TemplateError::OutOfRange {
            key: self.to_string(),
        };

        let mut value = self.anchor.base(reference);
        if let Some((quantity, unit)) = self.offset {
            value = shift(value, quantity, unit).ok_or_else(out_of_range)?;
        }
        self.anchor.truncate(value).ok_or_else(out_of_range)
    }

    /// strftime pattern used in filename mode, if the anchor has one
    pub(crate) fn filename_pattern(&self) -> Option<&'static str> {
        match self.token.as_str() {
            "y" | "Y" => Some("%Y"),
            "m" => Some("%m"),
            "d" | "D" => Some("%d"),
            "h" | "H" => Some("%H"),
            "M" => Some("%M"),
            "a" => Some("%a"),
            "A" => Some("%A"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token)?;
        if let Some((quantity, unit)) = self.offset {
            let letter = match unit {
                Unit::Years => 'y',
                Unit::Months => 'm',
                Unit::Days => 'd',
                Unit::Hours => 'h',
                Unit::Minutes => 'M',
                Unit::Weeks => 'w',
                Unit::Monday => 'f',
            };
            write!(f, "{quantity:+}{letter}")?;
        }
        Ok(())
    }
}

fn parse_offset(key: &str, sign: char, modifier: &str) -> Result<(i64, Unit), TemplateError> {
    let unit_char = modifier
        .chars()
        .last()
        .ok_or_else(|| TemplateError::UnknownUnit {
            key: key.to_string(),
        })?;
    let unit = Unit::from_char(unit_char).ok_or_else(|| TemplateError::UnknownUnit {
        key: key.to_string(),
    })?;

    let digits = &modifier[..modifier.len() - unit_char.len_utf8()];
    let quantity = format!("{sign}{digits}")
        .parse::<i64>()
        .map_err(|_| TemplateError::InvalidQuantity {
            key: key.to_string(),
        })?;

    // There is no zeroth Monday.
    if unit == Unit::Monday && quantity == 0 {
        return Err(TemplateError::InvalidQuantity {
            key: key.to_string(),
        });
    }

    Ok((quantity, unit))
}

fn shift(value: NaiveDateTime, quantity: i64, unit: Unit) -> Option<NaiveDateTime> {
    match unit {
        Unit::Years => shift_months(value, quantity.checked_mul(12)?),
        Unit::Months => shift_months(value, quantity),
        Unit::Days => value.checked_add_signed(Duration::try_days(quantity)?),
        Unit::Hours => value.checked_add_signed(Duration::try_hours(quantity)?),
        Unit::Minutes => value.checked_add_signed(Duration::try_minutes(quantity)?),
        Unit::Weeks => value.checked_add_signed(Duration::try_weeks(quantity)?),
        Unit::Monday => value.checked_add_signed(Duration::try_days(monday_jump(value, quantity)?)?),
    }
}

// Month arithmetic clamps to the last day of the target month.
fn shift_months(value: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        value.checked_add_months(magnitude)
    } else {
        value.checked_sub_months(magnitude)
    }
}

/// Days to move to reach the n-th Monday
///
/// Positive `n` counts forward and negative `n` backward, both counting
/// the start date itself when it is a Monday. Zero is rejected while
/// parsing.
fn monday_jump(value: NaiveDateTime, n: i64) -> Option<i64> {
    let weekday = i64::from(value.weekday().num_days_from_monday());
    let weeks = n.unsigned_abs().checked_sub(1)?;
    let mut jump = i64::try_from(weeks).ok()?.checked_mul(7)?;

    if n > 0 {
        jump += (7 - weekday) % 7;
        Some(jump)
    } else {
        jump += weekday;
        Some(-jump)
    }
}
