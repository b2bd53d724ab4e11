//! Relative-date templates
//!
//! Strings in report and result configuration may contain `{key}` fields
//! that resolve to dates relative to the run's reference time:
//!
//! | key | value on 2016-02-12 18:19:09 (ISO mode) |
//! |-----|------------------------------------------|
//! | `{now}` | `2016-02-12 18:19:09` |
//! | `{t-1d}` | `2016-02-11 00:00:00` |
//! | `{m}` | `2016-02-01 00:00:00` |
//! | `{w}` | `2016-02-08 00:00:00` |
//! | `{h+2h}` | `2016-02-12 20:00:00` |
//!
//! File names use [`FormatMode::Filename`], where each anchor letter picks
//! its own strftime key (`{y}{m}{d}` renders `20160212`).

pub mod clock;
pub mod formatter;
mod key;

pub use clock::{parse_now_override, parse_timezone, reference_time, TIMESTAMP_FORMAT};
pub use formatter::{format_template, FormatMode, TemplateFormatter};
