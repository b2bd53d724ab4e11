//! File source and sink
//!
//! Both adapters render their `filename` in filename mode
//! (`sales_{y}{m}{d}.csv`) and resolve it against the configuration's base
//! directory. The extension picks the format, see [`codec`].

pub mod codec;
pub mod sink;
pub mod source;

pub use codec::TabularFormat;
pub use sink::{build_sink, FileSink, FileSinkConfig};
pub use source::{build_source, FileSource, FileSourceConfig};

/// Registered type name of the file source and sink
pub const FILE_TYPE: &str = "file";
