//! Authenticated portal session.
//!
//! A [`Session`] owns the cookie jar, the HTTP client built around it, the
//! cached bridge session id and the logout link found at login. It lives for
//! exactly one run.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use reqwest::Client;
use reqwest::cookie::Jar;
use scraper::{Html, Selector};
use url::Url;

use crate::core::http::{self, Page};
use crate::core::redirect::{self, Form};
use crate::error::{Play24Error, Result};

/// Default portal location.
pub const DEFAULT_BASE_URL: &str = "https://24.play.pl";

/// Name of the username input on the sign-on form.
pub const USERNAME_FIELD: &str = "IDToken1";
/// Name of the password input on the sign-on form.
pub const PASSWORD_FIELD: &str = "IDToken2";

const WELCOME_PATH: &str = "/Play24/Welcome";
const SERVICES_PATH: &str = "/Play24/Services";
const BRIDGE_PATH: &str = "/Play24/dwr/call/plaincall/";

/// Upper bound on bounce pages followed in one leg of the handshake.
const MAX_BOUNCES: usize = 10;

static USERNAME_INPUT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("input[name={USERNAME_FIELD}]")).expect("valid selector")
});
static LANDING_MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#accountBallances").expect("valid selector"));
static LOGOUT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a#ssoLogout[href]").expect("valid selector"));

/// Portal addresses, all derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    base: Url,
}

impl Portal {
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if `base` is not an absolute URL.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Play24Error::Config(format!("invalid portal URL '{base}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Play24Error::Config(format!("invalid portal URL '{base}'")));
        }
        Ok(Self { base })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Play24Error::Config(format!("cannot build portal URL for {path}: {e}")))
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Entry point of the sign-on handshake.
    #[must_use]
    pub fn start_url(&self) -> Url {
        self.base.clone()
    }

    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if the URL cannot be built.
    pub fn welcome_url(&self) -> Result<Url> {
        self.join(WELCOME_PATH)
    }

    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if the URL cannot be built.
    pub fn services_url(&self) -> Result<Url> {
        self.join(SERVICES_PATH)
    }

    /// Path the bridge calls claim to originate from.
    #[must_use]
    pub const fn page_path(&self) -> &'static str {
        WELCOME_PATH
    }

    /// Plain-call endpoint of a bridge method.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] if the URL cannot be built.
    pub fn bridge_url(&self, script: &str, method: &str) -> Result<Url> {
        self.join(&format!("{BRIDGE_PATH}{script}.{method}.dwr"))
    }

    /// Whether `page` is the authenticated landing page.
    #[must_use]
    pub fn is_landing(&self, page: &Page) -> bool {
        page.url.path() == WELCOME_PATH
            || Html::parse_document(&page.body)
                .select(&LANDING_MARKER)
                .next()
                .is_some()
    }
}

/// Login name and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One run's authenticated context.
#[derive(Debug)]
pub struct Session {
    client: Client,
    jar: Arc<Jar>,
    portal: Portal,
    timeout: Duration,
    bridge_id: Option<String>,
    logout_url: Option<Url>,
}

impl Session {
    /// # Errors
    ///
    /// Returns [`Play24Error::Network`] if the HTTP client cannot be built.
    pub fn new(portal: Portal, timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = http::build_client(timeout, Arc::clone(&jar))?;
        Ok(Self {
            client,
            jar,
            portal,
            timeout,
            bridge_id: None,
            logout_url: None,
        })
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub const fn portal(&self) -> &Portal {
        &self.portal
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn bridge_id(&self) -> Option<&str> {
        self.bridge_id.as_deref()
    }

    pub(crate) fn set_bridge_id(&mut self, id: String) {
        self.bridge_id = Some(id);
    }

    /// Store a `Set-Cookie`-style cookie for the portal's domain.
    pub fn add_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, self.portal.base());
    }

    /// GET a portal page.
    ///
    /// # Errors
    ///
    /// Returns a transport error on failure or non-2xx status.
    pub async fn fetch(&self, url: &Url) -> Result<Page> {
        http::get(&self.client, url, self.timeout).await
    }

    /// Sign in and return the landing page.
    ///
    /// The whole handshake is bounded by the session timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Auth`] if the sign-on form or the landing page
    /// is never reached in time, or a transport error from any hop.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<Page> {
        let secs = self.timeout.as_secs();
        tracing::info!(login = %credentials.login, "signing in");
        match tokio::time::timeout(self.timeout, self.sign_on(credentials)).await {
            Ok(Err(Play24Error::Timeout(_))) | Err(_) => Err(Play24Error::Auth(format!(
                "sign-on did not complete within {secs}s"
            ))),
            Ok(result) => result,
        }
    }

    async fn sign_on(&mut self, credentials: &Credentials) -> Result<Page> {
        let mut page = self.fetch(&self.portal.start_url()).await?;

        let mut bounces = 0;
        let mut form = loop {
            if let Some(form) = login_form(&page)? {
                break form;
            }
            if bounces == MAX_BOUNCES || !redirect::is_bounce_page(&page)? {
                return Err(Play24Error::Auth(format!(
                    "sign-on form not found (stopped at {})",
                    page.url
                )));
            }
            page = redirect::follow(&self.client, &page, self.timeout).await?;
            bounces += 1;
        };

        form.set(USERNAME_FIELD, &credentials.login);
        form.set(PASSWORD_FIELD, &credentials.password);
        tracing::debug!(action = %form.action, "submitting credentials");
        page = http::post_form(&self.client, &form.action, &form.fields, self.timeout).await?;

        bounces = 0;
        while bounces < MAX_BOUNCES
            && !self.portal.is_landing(&page)
            && login_form(&page)?.is_none()
            && redirect::is_bounce_page(&page)?
        {
            page = redirect::follow(&self.client, &page, self.timeout).await?;
            bounces += 1;
        }

        if login_form(&page)?.is_some() {
            return Err(Play24Error::Auth("credentials rejected".to_string()));
        }
        if !self.portal.is_landing(&page) {
            return Err(Play24Error::Auth(format!(
                "landing page not reached (stopped at {})",
                page.url
            )));
        }

        self.logout_url = logout_link(&page);
        tracing::info!(url = %page.url, "signed in");
        Ok(page)
    }

    /// Sign out. Best-effort: failures are logged and swallowed.
    pub async fn logout(&mut self) {
        let Some(url) = self.logout_url.take() else {
            tracing::warn!("no logout link on the landing page, skipping logout");
            return;
        };
        match self.fetch(&url).await {
            Ok(_) => tracing::info!("signed out"),
            Err(e) => tracing::warn!(error = %e, "logout failed"),
        }
    }
}

/// The form carrying both credential inputs, if the page has one.
fn login_form(page: &Page) -> Result<Option<Form>> {
    Ok(Form::containing(page, &USERNAME_INPUT)?
        .filter(|form| form.fields.iter().any(|(name, _)| name == PASSWORD_FIELD)))
}

fn logout_link(page: &Page) -> Option<Url> {
    let document = Html::parse_document(&page.body);
    let href = document.select(&LOGOUT_LINK).next()?.value().attr("href")?;
    page.url.join(href).ok()
}
