//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Report the account balance and active services of a Play prepaid account.
#[derive(Parser, Debug)]
#[command(name = "play24")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output keys to print (default: `[cli] output` from the config, or all)
    #[arg(value_name = "KEY")]
    pub keys: Vec<String>,

    /// Config file to read instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// How to fetch the data (bridge, browser)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Portal markup version (tiles, legacy)
    #[arg(long, value_name = "VERSION", global = true)]
    pub portal_version: Option<String>,

    /// Timeout in seconds for sign-in and each request
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Save the downloaded HTML fragments into DIR (default: current directory)
    #[arg(
        short = 'k',
        long,
        value_name = "DIR",
        num_args = 0..=1,
        default_missing_value = "."
    )]
    pub keep: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(short, long)]
    pub debug: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands. Without one, a report is fetched.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// List the output keys of the selected portal version
    Keys,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `key: value` lines
    #[default]
    Human,
    /// JSON object with `balance` and `services` maps
    Json,
}
