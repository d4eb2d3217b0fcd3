//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::models::Report;
use crate::core::profile::PortalProfile;
use crate::error::Result;

/// Render a report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_report(report: &Report, format: OutputFormat, pretty: bool, color: bool) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_report(report, color)),
        OutputFormat::Json => robot::render_report_json(report, pretty),
    }
}

/// Render the key listing of a portal version.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_keys(profile: &PortalProfile, format: OutputFormat, pretty: bool, color: bool) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_keys(profile, color)),
        OutputFormat::Json => robot::render_keys_json(profile, pretty),
    }
}
