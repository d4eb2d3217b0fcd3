//! Default command: fetch and print the report.

use crate::core::pipeline;
use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;
use crate::util::env::{should_use_color, stdout_is_tty};

/// Execute one run and print the report to stdout.
///
/// # Errors
///
/// Returns the first failure of the run; nothing is printed in that case.
pub async fn execute(config: &ResolvedConfig) -> Result<()> {
    let credentials = config.credentials()?;
    let options = config.run_options();
    tracing::debug!(
        version = %options.version,
        mode = %options.mode,
        timeout_secs = options.timeout.as_secs(),
        keys = options.keys.len(),
        "starting run"
    );

    let report = pipeline::run(&options, &credentials).await?;
    let color = should_use_color(config.no_color, stdout_is_tty());
    let output = render::render_report(&report, config.format, config.pretty, color)?;
    print!("{output}");
    if !output.is_empty() && !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
