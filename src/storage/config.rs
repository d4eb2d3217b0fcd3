//! Configuration file loading and resolution.
//!
//! Loads configuration from `config.toml` in the platform config directory
//! (`~/.config/play24/config.toml` on Linux).
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `PLAY24_CONFIG`: Override config file path
//! - `PLAY24_LOGIN`: Account login
//! - `PLAY24_PASSWORD`: Account password
//! - `PLAY24_TIMEOUT`: Timeout in seconds
//! - `PLAY24_MODE`: Acquisition mode (bridge, browser)
//! - `PLAY24_PORTAL_VERSION`: Portal markup version (tiles, legacy)
//! - `PLAY24_BASE_URL`: Portal base URL
//! - `PLAY24_NO_COLOR` or `NO_COLOR`: Disable colors

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::pipeline::{AcquisitionMode, RunOptions};
use crate::core::profile::PortalVersion;
use crate::core::session::{Credentials, DEFAULT_BASE_URL, Portal};
use crate::error::{Play24Error, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_CONFIG: &str = "PLAY24_CONFIG";
pub const ENV_LOGIN: &str = "PLAY24_LOGIN";
pub const ENV_PASSWORD: &str = "PLAY24_PASSWORD";
pub const ENV_TIMEOUT: &str = "PLAY24_TIMEOUT";
pub const ENV_MODE: &str = "PLAY24_MODE";
pub const ENV_PORTAL_VERSION: &str = "PLAY24_PORTAL_VERSION";
pub const ENV_BASE_URL: &str = "PLAY24_BASE_URL";
pub const ENV_NO_COLOR: &str = "PLAY24_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "play24";

const DEFAULT_TIMEOUT_SECS: u64 = 20;
const MAX_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub login: Option<String>,
    /// Password from the environment or the config file. The keyring is
    /// consulted only when this is `None`.
    password: Option<Secret>,
    pub portal: Portal,
    pub version: PortalVersion,
    pub mode: AcquisitionMode,
    pub timeout: Duration,
    pub headless: bool,
    pub keep: Option<PathBuf>,
    /// Output keys; empty means everything.
    pub keys: Vec<String>,
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// A password that stays out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
struct Secret(String);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub config_file: Option<PathBuf>,
    pub login: ConfigSource,
    pub password: ConfigSource,
    pub portal: ConfigSource,
    pub version: ConfigSource,
    pub mode: ConfigSource,
    pub timeout: ConfigSource,
    pub keys: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env,
    ConfigFile,
    #[default]
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Pick the first present value by precedence, recording where it came from.
fn pick<T>(
    cli: Option<T>,
    env: Option<T>,
    file: Option<T>,
    source: &mut ConfigSource,
) -> Option<T> {
    if cli.is_some() {
        *source = ConfigSource::Cli;
        cli
    } else if env.is_some() {
        *source = ConfigSource::Env;
        env
    } else if file.is_some() {
        *source = ConfigSource::ConfigFile;
        file
    } else {
        *source = ConfigSource::Default;
        None
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, the process environment and
    /// the config file.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if the config file is invalid or any
    /// resolved value is out of range.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// [`Self::resolve`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if the config file is invalid or any
    /// resolved value is out of range.
    pub fn resolve_with(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| {
            env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut sources = ConfigSources::default();

        let path = cli
            .config
            .clone()
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
            .unwrap_or_else(|| AppPaths::new().config_file());
        let config = Config::load_from(&path)?;
        config.validate()?;
        sources.config_file = Some(path);

        let login = pick(None, env(ENV_LOGIN), config.auth.login.clone(), &mut sources.login);
        let password = pick(
            None,
            env(ENV_PASSWORD),
            config.auth.password.clone(),
            &mut sources.password,
        )
        .map(Secret);

        let base_url = pick(
            None,
            env(ENV_BASE_URL),
            config.portal.base_url.clone(),
            &mut sources.portal,
        )
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let portal = Portal::new(&base_url)?;

        let version = pick(
            cli.portal_version.clone(),
            env(ENV_PORTAL_VERSION),
            config.portal.version.clone(),
            &mut sources.version,
        )
        .map_or(Ok(PortalVersion::default()), |s| PortalVersion::from_arg(&s))?;

        let mode = pick(
            cli.mode.clone(),
            env(ENV_MODE),
            config.portal.mode.clone(),
            &mut sources.mode,
        )
        .map_or(Ok(AcquisitionMode::default()), |s| AcquisitionMode::from_arg(&s))?;

        let env_timeout = env(ENV_TIMEOUT)
            .map(|s| {
                s.parse::<u64>().map_err(|_| {
                    Play24Error::Config(format!("{ENV_TIMEOUT} must be a whole number of seconds"))
                })
            })
            .transpose()?;
        let timeout_secs = pick(
            cli.timeout,
            env_timeout,
            Some(config.browser.timeout),
            &mut sources.timeout,
        )
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
        validate_timeout(timeout_secs)?;

        let cli_keys = (!cli.keys.is_empty()).then(|| cli.keys.clone());
        let file_keys = config
            .cli
            .output
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|keys| !keys.is_empty());
        let keys = pick(cli_keys, None, file_keys, &mut sources.keys).unwrap_or_default();

        let no_color = cli.no_color
            || env(ENV_NO_COLOR).is_some_and(|v| is_truthy(&v))
            || env(ENV_NO_COLOR_STD).is_some();

        Ok(Self {
            login,
            password,
            portal,
            version,
            mode,
            timeout: Duration::from_secs(timeout_secs),
            headless: config.browser.headless && !cli.debug,
            keep: cli.keep.clone(),
            keys,
            format: cli.effective_format(),
            pretty: cli.pretty,
            no_color,
            sources,
        })
    }

    /// Login and password for the run.
    ///
    /// The password comes from `PLAY24_PASSWORD`, then `[auth] password`, then
    /// the OS keyring entry `play24/<login>`.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if no login is configured or no
    /// password can be found.
    pub fn credentials(&self) -> Result<Credentials> {
        let login = self.login.clone().ok_or_else(|| {
            Play24Error::Config(format!(
                "No login configured. Set [auth] login in the config file or {ENV_LOGIN}"
            ))
        })?;
        if let Some(Secret(password)) = &self.password {
            return Ok(Credentials::new(login, password.clone()));
        }

        tracing::debug!(service = KEYRING_SERVICE, "looking up password in keyring");
        let password = keyring::Entry::new(KEYRING_SERVICE, &login)
            .and_then(|entry| entry.get_password())
            .map_err(|e| {
                Play24Error::Config(format!(
                    "No password for {login}: set [auth] password or {ENV_PASSWORD} ({e})"
                ))
            })?;
        Ok(Credentials::new(login, password))
    }

    /// Options for the run pipeline.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            portal: self.portal.clone(),
            version: self.version,
            mode: self.mode,
            timeout: self.timeout,
            headless: self.headless,
            keep: self.keep.clone(),
            keys: self.keys.clone(),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn validate_timeout(secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(Play24Error::Config(format!(
            "Timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
        )));
    }
    Ok(())
}

// =============================================================================
// Config file
// =============================================================================

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub browser: BrowserConfig,
    pub portal: PortalConfig,
    pub cli: CliConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login: Option<String>,
    /// Optional; the keyring is used when absent.
    pub password: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Waits and request timeouts. The section name predates the bridge mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Seconds.
    pub timeout: u64,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: Option<String>,
    /// `tiles` or `legacy`.
    pub version: Option<String>,
    /// `bridge` or `browser`.
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Space-separated output keys.
    pub output: Option<String>,
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Play24Error::Config(format!("Invalid config file {}: {e}", path.display())))
    }

    /// Check values that can be checked without the CLI or environment.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        validate_timeout(self.browser.timeout)?;
        if let Some(version) = &self.portal.version {
            PortalVersion::from_arg(version)?;
        }
        if let Some(mode) = &self.portal.mode {
            AcquisitionMode::from_arg(mode)?;
        }
        if let Some(base_url) = &self.portal.base_url {
            Portal::new(base_url)?;
        }
        Ok(())
    }
}
