//! Error rendering for stderr.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::{ErrorCategory, Play24Error};

/// What the user can do about an error of this kind.
#[must_use]
pub const fn hint(error: &Play24Error) -> Option<&'static str> {
    match error.category() {
        ErrorCategory::Authentication => {
            Some("Check [auth] login and password, or try again later if the portal is rate limiting.")
        }
        ErrorCategory::Protocol | ErrorCategory::Markup => Some(
            "The portal markup has probably changed. Re-run with --keep to save the raw HTML.",
        ),
        ErrorCategory::Configuration => match error {
            Play24Error::InvalidKey(_) => Some("Run `play24 keys` to list valid output keys."),
            _ => None,
        },
        ErrorCategory::Network => match error {
            Play24Error::Timeout(_) => Some("Raise the timeout with --timeout or [browser] timeout."),
            _ => None,
        },
        ErrorCategory::Internal => None,
    }
}

#[derive(Serialize)]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    is_retryable: bool,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

impl ErrorJson {
    fn from_error(error: &Play24Error) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            exit_code: error.exit_code() as u8,
            hint: hint(error),
        }
    }
}

/// Plain text: `error[CODE]: message` plus an optional hint line.
#[must_use]
pub fn render_simple(error: &Play24Error, color: bool) -> String {
    let header = format!("error[{}]", error.error_code());
    let mut out = if color {
        format!("{}: {error}", header.red().bold())
    } else {
        format!("{header}: {error}")
    };
    if let Some(hint) = hint(error) {
        out.push_str("\n  hint: ");
        out.push_str(hint);
    }
    out
}

/// Structured error object for machine consumption.
#[must_use]
pub fn render_error_json(error: &Play24Error, pretty: bool) -> String {
    let json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    rendered.unwrap_or_else(|_| render_simple(error, false))
}

/// Render an error in the output format the run was asked for.
#[must_use]
pub fn render_error(error: &Play24Error, format: OutputFormat, pretty: bool, color: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human => render_simple(error, color),
    }
}
