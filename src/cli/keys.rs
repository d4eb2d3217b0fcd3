//! `keys` command: list the output keys of the selected portal version.

use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;
use crate::util::env::{should_use_color, stdout_is_tty};

/// # Errors
///
/// Returns an error if JSON rendering fails.
pub fn execute(config: &ResolvedConfig) -> Result<()> {
    let color = should_use_color(config.no_color, stdout_is_tty());
    let output = render::render_keys(config.version.profile(), config.format, config.pretty, color)?;
    println!("{}", output.trim_end());
    Ok(())
}
