//! A wiremock stand-in for the portal: sign-on hand-off, landing page,
//! bridge endpoints and logout.
#![allow(dead_code)]

use std::time::Duration;

use play24::core::{AcquisitionMode, Credentials, Portal, PortalVersion, RunOptions};
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures;

pub const LOGIN: &str = "500100200";
pub const PASSWORD: &str = "sekret";
pub const BRIDGE_ID: &str = "Xq1Zk7HsAbCdEf";

pub const CONSUMER_PATH: &str = "/sso/Consumer";
pub const LOGIN_PATH: &str = "/sso/UI/Login";
pub const WELCOME_PATH: &str = "/Play24/Welcome";
pub const LOGOUT_PATH: &str = "/Play24/Logout";
pub const INIT_PATH: &str = "/Play24/dwr/call/plaincall/__System.generateId.dwr";
pub const BALANCE_PATH: &str =
    "/Play24/dwr/call/plaincall/balanceRemoteService.getBalances.dwr";
pub const SERVICES_PATH: &str =
    "/Play24/dwr/call/plaincall/servicesRemoteService.getComponentsList.dwr";

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn script(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/javascript; charset=utf-8")
}

#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new(LOGIN, PASSWORD)
}

pub struct MockPortal {
    pub server: MockServer,
}

impl MockPortal {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Bridge-mode run options pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server URI is not a valid base URL.
    #[must_use]
    pub fn run_options(&self, timeout: Duration) -> RunOptions {
        RunOptions {
            portal: Portal::new(&self.uri()).expect("mock server URI is a base URL"),
            version: PortalVersion::Tiles,
            mode: AcquisitionMode::Bridge,
            timeout,
            headless: true,
            keep: None,
            keys: Vec::new(),
        }
    }

    /// Start page that bounces once before the sign-on form.
    pub async fn mount_hand_off(&self) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(fixtures::bounce_page(CONSUMER_PATH)))
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path(CONSUMER_PATH))
            .and(body_string_contains("realm=play"))
            .respond_with(html(fixtures::login_page(LOGIN_PATH)))
            .mount(&self.server)
            .await;
    }

    /// Accept [`LOGIN`]/[`PASSWORD`] and redirect to the landing page; any
    /// other credentials get the form again.
    pub async fn mount_sign_on(&self, logout_link: bool) {
        self.mount_hand_off().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_string_contains(format!("IDToken1={LOGIN}")))
            .and(body_string_contains(format!("IDToken2={PASSWORD}")))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", WELCOME_PATH))
            .with_priority(1)
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(html(fixtures::login_page(LOGIN_PATH)))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(WELCOME_PATH))
            .respond_with(html(fixtures::landing_page(
                logout_link.then_some(LOGOUT_PATH),
            )))
            .mount(&self.server)
            .await;
    }

    /// Bridge endpoints. The session id must be requested exactly once and
    /// every call must carry it in both the cookie and the token.
    pub async fn mount_bridge(&self, balance: &str, services: &str) {
        Mock::given(method("POST"))
            .and(path(INIT_PATH))
            .and(body_string_contains("c0-methodName=generateId"))
            .respond_with(script(fixtures::init_reply(BRIDGE_ID)))
            .expect(1)
            .mount(&self.server)
            .await;
        self.mount_call(
            BALANCE_PATH,
            "c0-methodName=getBalances",
            script(fixtures::bridge_reply(balance)),
        )
        .await;
        self.mount_call(
            SERVICES_PATH,
            "c0-param0=string:PACKAGES",
            script(fixtures::bridge_reply(services)),
        )
        .await;
    }

    pub async fn mount_call(&self, endpoint: &str, body_marker: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header_regex("cookie", &format!("DWRSESSIONID={BRIDGE_ID}")))
            .and(body_string_contains(body_marker))
            .and(body_string_contains(format!("scriptSessionId={BRIDGE_ID}/")))
            .and(body_string_contains("page=%2FPlay24%2FWelcome"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Logout endpoint, verified to be hit `times` times when the server drops.
    pub async fn mount_logout(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path(LOGOUT_PATH))
            .respond_with(html("<html><title>Logowanie</title></html>".to_string()))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}
