//! play24 - Play prepaid account report
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::process::ExitCode;

use clap::Parser;

use play24::cli::{Cli, Commands};
use play24::core::logging;
use play24::storage::ResolvedConfig;
use play24::util::env::{should_use_color, stderr_is_tty};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(logging::parse_log_level_from_env)
        .unwrap_or_default();
    let log_format = logging::parse_log_format_from_env().unwrap_or_default();
    let log_file = logging::parse_log_file_from_env();
    logging::init(log_level, log_format, log_file, cli.verbose);

    let format = cli.effective_format();
    let pretty = cli.pretty;
    let color = should_use_color(cli.no_color, stderr_is_tty());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            eprintln!(
                "{}",
                play24::render::error::render_error(&e, format, pretty, color)
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli) -> play24::Result<()> {
    let config = ResolvedConfig::resolve(cli)?;
    tracing::debug!(
        config_file = ?config.sources.config_file,
        version = %config.sources.version,
        mode = %config.sources.mode,
        timeout = %config.sources.timeout,
        keys = %config.sources.keys,
        "configuration resolved"
    );

    match cli.command {
        None => play24::cli::report::execute(&config).await,
        Some(Commands::Keys) => play24::cli::keys::execute(&config),
    }
}
