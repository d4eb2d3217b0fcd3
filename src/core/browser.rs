//! Browser-driven acquisition.
//!
//! Drives a local Chrome or Chromium through the portal UI instead of
//! speaking the bridge protocol. Every wait is a polling loop bounded by the
//! run timeout.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use serde::de::DeserializeOwned;

use crate::core::session::{Credentials, PASSWORD_FIELD, Portal, USERNAME_FIELD};
use crate::error::{Play24Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Pause between credential keystroke bursts.
const TYPING_PAUSE: Duration = Duration::from_secs(2);

const SUBMIT_BUTTON: &str = "button[name='Login.Submit']";
const BALANCE_BUTTON: &str = "#accountBallances a";
const BALANCE_MODAL: &str = "#ballancesModalBox";
const MODAL_CLOSE: &str = "#fancybox-close";
const SERVICES_CONTAINER: &str = ".container.services";
const LOGOUT_BUTTON: &str = "#ssoLogout";
const LOGOUT_TITLE: &str = "Logowanie";

/// Locate a Chrome or Chromium executable.
fn find_chrome() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PLAY24_CHROME") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }
    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// A JavaScript string literal for `s`.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Expression that is true when no loading spinner is visible.
const NO_VISIBLE_LOADER: &str = "Array.from(document.querySelectorAll('.loader-content'))\
    .every(e => e.offsetParent === null)";

fn visible_js(selector: &str) -> String {
    format!(
        "(() => {{ const e = document.querySelector({}); return !!e && e.offsetParent !== null; }})()",
        js_string(selector)
    )
}

fn present_js(selectors: &[&str]) -> String {
    let checks: Vec<String> = selectors
        .iter()
        .map(|s| format!("!!document.querySelector({})", js_string(s)))
        .collect();
    checks.join(" && ")
}

fn url_is_js(url: &str) -> String {
    format!("window.location.href === {}", js_string(url))
}

/// A launched browser with one tab open on the portal.
pub struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
    page: Page,
    portal: Portal,
    timeout: Duration,
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

impl BrowserSession {
    /// Start Chromium, headless unless `headless` is false.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Browser`] if no browser is found or it fails to
    /// start.
    pub async fn launch(portal: Portal, timeout: Duration, headless: bool) -> Result<Self> {
        Self::launch_inner(portal, timeout, headless)
            .await
            .map_err(|e| Play24Error::Browser(format!("{e:#}")))
    }

    async fn launch_inner(portal: Portal, timeout: Duration, headless: bool) -> anyhow::Result<Self> {
        let chrome = find_chrome().context("Chrome/Chromium not found; set PLAY24_CHROME")?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("failed to configure browser: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;
        let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a tab")?;
        tracing::info!(headless, "browser started");

        Ok(Self {
            browser,
            handler_task,
            page,
            portal,
            timeout,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, js: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| Play24Error::Browser(format!("script evaluation failed: {e}")))?;
        result
            .into_value()
            .map_err(|e| Play24Error::Browser(format!("unexpected script result: {e}")))
    }

    /// Poll `js` until it yields true. Returns false on timeout.
    async fn wait_until(&self, js: &str) -> bool {
        let deadline = Instant::now() + self.timeout;
        loop {
            // Scripts may fail mid-navigation; treat that as "not yet".
            if self.eval::<bool>(js).await.unwrap_or(false) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_or_timeout(&self, js: &str, what: &str) -> Result<()> {
        if self.wait_until(js).await {
            Ok(())
        } else {
            tracing::debug!(what, "wait timed out");
            Err(Play24Error::Timeout(self.timeout.as_secs()))
        }
    }

    async fn goto(&self, url: &url::Url) -> Result<()> {
        tracing::debug!(%url, "navigate");
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| Play24Error::Browser(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let clicked: bool = self
            .eval(&format!(
                "(() => {{ const e = document.querySelector({}); if (!e) return false; e.click(); return true; }})()",
                js_string(selector)
            ))
            .await?;
        if clicked {
            Ok(())
        } else {
            Err(Play24Error::Browser(format!("element {selector} not found")))
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| Play24Error::Browser(format!("element {selector} not found: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| Play24Error::Browser(e.to_string()))?
            .type_str(text)
            .await
            .map_err(|e| Play24Error::Browser(e.to_string()))?;
        Ok(())
    }

    async fn inner_html(&self, selector: &str) -> Result<String> {
        let html: Option<String> = self
            .eval(&format!(
                "(() => {{ const e = document.querySelector({}); return e ? e.innerHTML : null; }})()",
                js_string(selector)
            ))
            .await?;
        html.ok_or_else(|| Play24Error::Browser(format!("element {selector} not found")))
    }

    /// Sign in through the UI.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Auth`] if the form or the loaded profile is not
    /// observed within the timeout.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let username = format!("input[name={USERNAME_FIELD}]");
        let password = format!("input[name={PASSWORD_FIELD}]");
        tracing::info!(login = %credentials.login, "signing in");

        self.goto(&self.portal.start_url()).await?;
        if !self.wait_until(&present_js(&[&username, &password, SUBMIT_BUTTON])).await {
            return Err(Play24Error::Auth("sign-on form never appeared".to_string()));
        }

        self.type_into(&username, &credentials.login).await?;
        tokio::time::sleep(TYPING_PAUSE).await;
        self.type_into(&password, &credentials.password).await?;
        tokio::time::sleep(TYPING_PAUSE).await;
        self.click(SUBMIT_BUTTON).await?;

        let profile_loaded = format!(
            "{} && {} && {NO_VISIBLE_LOADER}",
            url_is_js(self.portal.welcome_url()?.as_str()),
            present_js(&[BALANCE_BUTTON]),
        );
        if !self.wait_until(&profile_loaded).await {
            return Err(Play24Error::Auth("profile page never finished loading".to_string()));
        }
        tracing::info!("signed in");
        Ok(())
    }

    /// Open the balance modal and return its markup.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Timeout`] if the modal does not open or close in
    /// time.
    pub async fn read_balance(&self) -> Result<String> {
        self.click(BALANCE_BUTTON).await?;
        self.wait_or_timeout(&visible_js(BALANCE_MODAL), "balance modal open")
            .await?;
        let html = self.inner_html(BALANCE_MODAL).await?;
        self.click(MODAL_CLOSE).await?;
        self.wait_or_timeout(&format!("!{}", visible_js(BALANCE_MODAL)), "balance modal closed")
            .await?;
        Ok(html)
    }

    /// Load the services page and return the services container markup.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Timeout`] if the page does not settle in time.
    pub async fn read_services(&self) -> Result<String> {
        let url = self.portal.services_url()?;
        self.goto(&url).await?;
        self.wait_or_timeout(
            &format!("{} && {NO_VISIBLE_LOADER}", url_is_js(url.as_str())),
            "services page",
        )
        .await?;
        self.inner_html(SERVICES_CONTAINER).await
    }

    /// Sign out. Best-effort: failures are logged and swallowed.
    pub async fn logout(&self) {
        if let Err(e) = self.click(LOGOUT_BUTTON).await {
            tracing::warn!(error = %e, "logout control missing, skipping logout");
            return;
        }
        let signed_out = format!("document.title.includes({})", js_string(LOGOUT_TITLE));
        if self.wait_until(&signed_out).await {
            tracing::info!("signed out");
        } else {
            tracing::warn!("logout did not reach the sign-on page");
        }
    }

    /// Shut the browser down.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
    }
}
