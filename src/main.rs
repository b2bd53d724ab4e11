// Harbor - Configuration-driven report runner
// Copyright (c) 2025 Harbor Contributors
// Licensed under the MIT License

use harbor::cli::Cli;
use harbor::config::LoggingConfig;
use harbor::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = match &cli.log_dir {
        Some(dir) => LoggingConfig::with_directory(dir.clone()),
        None => LoggingConfig::console(),
    };
    let guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Harbor starting");

    let exit_code = match cli.run.execute(&cli.config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors, flush the log writer first
    drop(guard);
    process::exit(exit_code);
}
