//! Error types for play24.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! - **Authentication**: the login form or the authenticated landing page was
//!   never reached
//! - **Network**: non-2xx responses, connection failures, timeouts
//! - **Protocol**: the remote-call bridge answered with something that does not
//!   match its envelope grammar
//! - **Markup**: portal HTML no longer matches the extraction rules or the
//!   label vocabulary
//! - **Configuration**: config file problems, unknown output keys
//! - **Internal**: I/O, JSON, browser backend and unclassified errors
//!
//! Every error surfaces to the caller immediately; nothing in the library
//! retries. [`Play24Error::is_retryable`] lets a caller decide whether a
//! re-run is worth it.

use thiserror::Error;

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Login did not complete.
    Authentication,
    /// HTTP status, connection and timeout failures.
    Network,
    /// Bridge envelope or payload did not match the expected grammar.
    Protocol,
    /// Extraction, label lookup and value parsing failures.
    Markup,
    /// Config file and output key problems.
    Configuration,
    /// Everything else.
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Protocol => "Bridge protocol error",
            Self::Markup => "Portal markup error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Protocol => "P",
            Self::Markup => "M",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Login failed
    AuthError = 2,
    /// Protocol, markup or parse failure (portal changed)
    ParseError = 3,
    /// Timeout
    Timeout = 4,
    /// Invalid configuration or output key
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for play24 operations.
#[derive(Error, Debug)]
pub enum Play24Error {
    // ==========================================================================
    // Authentication
    // ==========================================================================
    /// Login form or profile-loaded marker was never observed.
    #[error("login failed: {0}")]
    Auth(String),

    // ==========================================================================
    // Network
    // ==========================================================================
    /// Non-2xx response or failed request.
    #[error("HTTP {status} from {url}")]
    Transport { status: u16, url: String },

    /// Request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// A request or a wait exceeded the configured timeout.
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    // ==========================================================================
    // Protocol
    // ==========================================================================
    /// Bridge init or reply envelope did not match.
    #[error("bridge protocol error: {0}")]
    Protocol(String),

    // ==========================================================================
    // Markup
    // ==========================================================================
    /// A required value node is missing from a markup row.
    #[error("required value missing for row '{label}'")]
    Extraction { label: String },

    /// An extracted label is not in the label table.
    #[error("unrecognized label: {0}")]
    Lookup(String),

    /// A raw value does not match its expected lexical form.
    #[error("invalid {kind}: '{raw}'")]
    Parse { kind: &'static str, raw: String },

    // ==========================================================================
    // Configuration
    // ==========================================================================
    /// A requested output key is in neither report map.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Config file or resolved setting is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    // ==========================================================================
    // Internal
    // ==========================================================================
    /// Browser backend failure.
    #[error("browser error: {0}")]
    Browser(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Play24Error {
    /// Shorthand for a [`Play24Error::Parse`].
    pub fn parse(kind: &'static str, raw: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            raw: raw.into(),
        }
    }

    /// Map a reqwest failure, keeping timeouts distinguishable.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if let Some(status) = err.status() {
            Self::Transport {
                status: status.as_u16(),
                url: err.url().map(ToString::to_string).unwrap_or_default(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Auth(_) => ExitCode::AuthError,
            Self::Protocol(_)
            | Self::Extraction { .. }
            | Self::Lookup(_)
            | Self::Parse { .. } => ExitCode::ParseError,
            Self::Timeout(_) => ExitCode::Timeout,
            Self::InvalidKey(_) | Self::Config(_) => ExitCode::ConfigError,
            Self::Transport { .. }
            | Self::Network(_)
            | Self::Browser(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Transport { .. } | Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Extraction { .. } | Self::Lookup(_) | Self::Parse { .. } => ErrorCategory::Markup,
            Self::InvalidKey(_) | Self::Config(_) => ErrorCategory::Configuration,
            Self::Browser(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `P24-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "P24-A001",

            Self::Transport { .. } => "P24-N001",
            Self::Timeout(_) => "P24-N002",
            Self::Network(_) => "P24-N099",

            Self::Protocol(_) => "P24-P001",

            Self::Extraction { .. } => "P24-M001",
            Self::Lookup(_) => "P24-M002",
            Self::Parse { .. } => "P24-M003",

            Self::InvalidKey(_) => "P24-C001",
            Self::Config(_) => "P24-C002",

            Self::Browser(_) => "P24-X001",
            Self::Io(_) => "P24-X002",
            Self::Json(_) => "P24-X003",
            Self::Other(_) => "P24-X099",
        }
    }

    /// Whether re-running the whole scrape might succeed.
    ///
    /// Login failures and timeouts are plausibly transient (rate limiting, a
    /// slow portal). Protocol and markup failures mean the portal changed and
    /// the tables need updating.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Timeout(_) | Self::Network(_))
    }
}

/// Result type alias for play24 operations.
pub type Result<T> = std::result::Result<T, Play24Error>;
