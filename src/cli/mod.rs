//! CLI argument parsing and command dispatch.

pub mod args;
pub mod keys;
pub mod report;

pub use args::{Cli, Commands, OutputFormat};
