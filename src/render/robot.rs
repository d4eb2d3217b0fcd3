//! Machine-readable JSON output.

use serde::Serialize;

use crate::core::models::Report;
use crate::core::profile::PortalProfile;
use crate::error::Result;

/// Serialize any value as compact or pretty JSON.
///
/// # Errors
///
/// Returns [`crate::error::Play24Error::Json`] if serialization fails.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    })
}

/// `{"balance": {...}, "services": {...}}`.
///
/// # Errors
///
/// Returns [`crate::error::Play24Error::Json`] if serialization fails.
pub fn render_report_json(report: &Report, pretty: bool) -> Result<String> {
    render_json(report, pretty)
}

#[derive(Serialize)]
struct KeysJson<'a> {
    version: &'a str,
    balance: Vec<&'static str>,
    services: Vec<&'static str>,
}

/// Key listing as JSON.
///
/// # Errors
///
/// Returns [`crate::error::Play24Error::Json`] if serialization fails.
pub fn render_keys_json(profile: &PortalProfile, pretty: bool) -> Result<String> {
    render_json(
        &KeysJson {
            version: profile.version.name(),
            balance: profile.balance_keys(),
            services: profile.service_keys(),
        },
        pretty,
    )
}
