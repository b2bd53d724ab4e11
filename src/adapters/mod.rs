//! Source and sink adapters for Harbor.
//!
//! A report's `type` selects a [`Source`]; each entry of its `results`
//! selects a [`Sink`]. Both are built by factories held in the
//! [`AdapterRegistry`]:
//!
//! - [`file`] - reads and writes CSV, TSV, JSON or raw files
//! - [`command`] - runs a bash script and parses its output (`bash`)
//! - [`structural`] - `fixed` and `partitioned` wrappers around other results
//!
//! # Custom adapters
//!
//! ```rust,no_run
//! use harbor::adapters::{AdapterRegistry, Sink};
//! use harbor::domain::{ReportData, Result};
//! use async_trait::async_trait;
//!
//! struct Discard;
//!
//! #[async_trait]
//! impl Sink for Discard {
//!     async fn save(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = AdapterRegistry::with_builtins();
//! registry.register_sink("discard", |_ctx, _data: ReportData, _fields| {
//!     Ok(Box::new(Discard) as Box<dyn Sink>)
//! });
//! ```

pub mod command;
pub mod file;
pub mod registry;
pub mod structural;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::AdapterRegistry;
pub use traits::{
    decode_fields, AdapterContext, AdapterFields, Sink, SinkFactory, Source, SourceFactory,
};
