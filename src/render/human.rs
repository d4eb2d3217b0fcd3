//! Human-readable output: one `key: value` line per entry.

use colored::Colorize;

use crate::core::models::{BalanceValue, Report};
use crate::core::profile::PortalProfile;

fn line(key: &str, value: &BalanceValue, color: bool) -> String {
    if !color {
        return format!("{key}: {value}");
    }
    let value = value.to_string();
    let value = match value.as_str() {
        "true" => value.green().to_string(),
        "false" => value.dimmed().to_string(),
        _ => value,
    };
    format!("{}: {value}", key.cyan())
}

/// Balance entries then service entries, sorted by key within each group.
#[must_use]
pub fn render_report(report: &Report, color: bool) -> String {
    let mut output = String::new();
    for (key, value) in report.entries() {
        output.push_str(&line(key, value, color));
        output.push('\n');
    }
    output
}

/// The canonical keys a profile can produce, grouped.
#[must_use]
pub fn render_keys(profile: &PortalProfile, color: bool) -> String {
    let heading = |title: &str| {
        if color {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    };
    let mut output = format!("{} ({})\n", heading("balance"), profile.version);
    for key in profile.balance_keys() {
        output.push_str(&format!("  {key}\n"));
    }
    output.push_str(&format!("{}\n", heading("services")));
    for key in profile.service_keys() {
        output.push_str(&format!("  {key}\n"));
    }
    output
}
