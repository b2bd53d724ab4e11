//! CLI interface and argument parsing
//!
//! A single command: `harbor [OPTIONS] [REPORT] [--key value ...]`.
//! Unrecognised `--key value` pairs after the report name are forwarded to
//! every adapter as extra arguments.

pub mod commands;

use clap::Parser;

/// Harbor - configuration-driven report runner
#[derive(Parser, Debug)]
#[command(name = "harbor")]
#[command(version, about, long_about = None)]
#[command(author = "Harbor Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json", env = "HARBOR_CONFIG_FILE_PATH")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, env = "HARBOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,

    #[command(flatten)]
    pub run: commands::run::RunArgs,
}
