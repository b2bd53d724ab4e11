// Harbor - Configuration-driven report runner
// Copyright (c) 2025 Harbor Contributors
// Licensed under the MIT License

//! # Harbor - configuration-driven report runner
//!
//! Harbor reads a JSON configuration of named reports. Each report fetches
//! data through a source adapter and hands it to one or more result
//! adapters. File names and scripts may carry relative-date templates such
//! as `{m-1d}` that resolve against a configurable reference time.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Template language and report execution
//! - [`adapters`] - Sources, sinks and the adapter registry
//! - [`domain`] - Report data and error types
//! - [`config`] - Configuration loading, includes and credential profiles
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use harbor::adapters::AdapterRegistry;
//! use harbor::config::Config;
//! use harbor::core::runner::{Runner, RunnerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.json", None)?;
//!     let runner = Runner::new(config, AdapterRegistry::with_builtins(), RunnerOptions::default())?;
//!
//!     let summary = runner.run_all().await;
//!     println!("{} of {} reports completed", summary.completed.len(), summary.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Templates
//!
//! ```rust
//! use chrono::NaiveDate;
//! use harbor::core::template::format_template;
//!
//! let now = NaiveDate::from_ymd_opt(2016, 2, 12)
//!     .unwrap()
//!     .and_hms_opt(18, 19, 9)
//!     .unwrap();
//!
//! let since = format_template("since {m-1m}", now, None).unwrap();
//! assert_eq!(since, "since 2016-01-01 00:00:00");
//! ```
//!
//! ## Error Handling
//!
//! Harbor uses the [`domain::HarborError`] type for all errors:
//!
//! ```rust,no_run
//! use harbor::domain::HarborError;
//!
//! fn example() -> Result<(), HarborError> {
//!     let config = harbor::config::Config::from_file("config.json", None)?;
//!     config.report("daily_sales")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
