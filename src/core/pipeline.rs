//! Run pipeline.
//!
//! Sign in, fetch the balance and services fragments, sign out, then turn the
//! fragments into a [`Report`]. Strictly sequential; any failure ends the run.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::bridge;
use crate::core::extract::extract;
use crate::core::filter::filter_report;
use crate::core::labels::dispatch;
use crate::core::models::Report;
use crate::core::profile::{PortalProfile, PortalVersion};
use crate::core::session::{Credentials, Portal, Session};
use crate::error::{Play24Error, Result};

/// File names used by `--keep`.
pub const BALANCE_FILE: &str = "balance.html";
pub const SERVICES_FILE: &str = "services.html";

/// How the fragments are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    /// Speak the portal's AJAX bridge protocol over plain HTTP.
    #[default]
    Bridge,
    /// Drive a local Chromium through the UI.
    Browser,
}

impl AcquisitionMode {
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] for an unknown mode name.
    pub fn from_arg(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bridge" => Ok(Self::Bridge),
            "browser" => Ok(Self::Browser),
            other => Err(Play24Error::Config(format!(
                "Unknown mode '{other}'. Valid modes: bridge, browser"
            ))),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bridge => "bridge",
            Self::Browser => "browser",
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw markup of the two fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub balance: String,
    pub services: String,
}

/// Everything one run needs besides the credentials.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub portal: Portal,
    pub version: PortalVersion,
    pub mode: AcquisitionMode,
    pub timeout: Duration,
    pub headless: bool,
    /// Directory to persist the raw fragments to.
    pub keep: Option<PathBuf>,
    /// Output keys to keep; empty keeps everything.
    pub keys: Vec<String>,
}

/// Fetch both fragments with the configured mode.
///
/// # Errors
///
/// Returns the first failure of any step.
pub async fn acquire(options: &RunOptions, credentials: &Credentials) -> Result<Fragments> {
    let start = Instant::now();
    let fragments = match options.mode {
        AcquisitionMode::Bridge => acquire_bridge(options, credentials).await,
        AcquisitionMode::Browser => acquire_browser(options, credentials).await,
    }?;
    tracing::info!(
        mode = %options.mode,
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        balance_bytes = fragments.balance.len(),
        services_bytes = fragments.services.len(),
        "fragments acquired"
    );
    Ok(fragments)
}

async fn acquire_bridge(options: &RunOptions, credentials: &Credentials) -> Result<Fragments> {
    let profile = options.version.profile();
    let mut session = Session::new(options.portal.clone(), options.timeout)?;
    session.login(credentials).await?;

    let fetched = fetch_bridge(&mut session, profile).await;
    session.logout().await;
    fetched
}

async fn fetch_bridge(session: &mut Session, profile: &PortalProfile) -> Result<Fragments> {
    let balance = bridge::call(session, &profile.balance_call).await?;
    let services = bridge::call(session, &profile.services_call).await?;
    Ok(Fragments { balance, services })
}

#[cfg(feature = "browser")]
async fn acquire_browser(options: &RunOptions, credentials: &Credentials) -> Result<Fragments> {
    use crate::core::browser::BrowserSession;

    let browser =
        BrowserSession::launch(options.portal.clone(), options.timeout, options.headless).await?;
    let fetched = async {
        browser.login(credentials).await?;
        read_then_sign_out(read_browser(&browser), browser.logout()).await
    }
    .await;
    browser.close().await;
    fetched
}

#[cfg(feature = "browser")]
async fn read_browser(browser: &crate::core::browser::BrowserSession) -> Result<Fragments> {
    let balance = browser.read_balance().await?;
    let services = browser.read_services().await?;
    Ok(Fragments { balance, services })
}

/// Await `read`, then `sign_out` whether or not the read succeeded.
#[cfg(any(feature = "browser", test))]
async fn read_then_sign_out<T>(
    read: impl Future<Output = Result<T>>,
    sign_out: impl Future<Output = ()>,
) -> Result<T> {
    let fetched = read.await;
    sign_out.await;
    fetched
}

#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
async fn acquire_browser(_options: &RunOptions, _credentials: &Credentials) -> Result<Fragments> {
    Err(Play24Error::Config(
        "browser mode is not available: play24 was built without the `browser` feature"
            .to_string(),
    ))
}

/// Write the raw fragments into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`Play24Error::Io`] if the directory or files cannot be written.
pub fn keep_fragments(dir: &Path, fragments: &Fragments) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(BALANCE_FILE), &fragments.balance)?;
    std::fs::write(dir.join(SERVICES_FILE), &fragments.services)?;
    tracing::info!(dir = %dir.display(), "raw fragments saved");
    Ok(())
}

/// Extract and dispatch both fragments.
///
/// # Errors
///
/// Returns extraction, lookup or parse errors.
pub fn build_report(profile: &PortalProfile, fragments: &Fragments) -> Result<Report> {
    let balance = dispatch(
        &extract(&fragments.balance, &profile.balance_rule)?,
        profile.balance_labels,
    )?;
    let services = dispatch(
        &extract(&fragments.services, &profile.services_rule)?,
        profile.service_labels,
    )?;
    tracing::debug!(
        version = %profile.version,
        balance = balance.len(),
        services = services.len(),
        "report built"
    );
    Ok(Report::new(balance, services))
}

/// One complete run: acquire, optionally persist, parse, filter.
///
/// # Errors
///
/// Returns the first failure of any step. There is no partial result.
pub async fn run(options: &RunOptions, credentials: &Credentials) -> Result<Report> {
    let fragments = acquire(options, credentials).await?;
    if let Some(dir) = &options.keep {
        keep_fragments(dir, &fragments)?;
    }
    let report = build_report(options.version.profile(), &fragments)?;
    filter_report(&report, &options.keys)
}
