//! Core logic for Harbor.
//!
//! # Modules
//!
//! - [`template`] - Relative-date template language
//! - [`runner`] - Report execution and run summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use harbor::adapters::AdapterRegistry;
//! use harbor::config::Config;
//! use harbor::core::runner::{Runner, RunnerOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.json", None)?;
//! let runner = Runner::new(config, AdapterRegistry::with_builtins(), RunnerOptions::default())?;
//!
//! let summary = runner.run_report("daily_sales").await?;
//! println!("{} results saved", summary.results_saved);
//! # Ok(())
//! # }
//! ```

pub mod runner;
pub mod template;
