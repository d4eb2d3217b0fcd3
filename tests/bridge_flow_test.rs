//! Bridge-mode runs against a mock portal.
//!
//! Covers the sign-on hand-off, bridge session setup, both fragment calls and
//! logout, plus the ways each of those can fail.

mod common;

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use play24::core::session::Session;
use play24::core::{BalanceValue, Credentials, Portal, run};
use play24::error::{ExitCode, Play24Error};

use common::fixtures::{bridge_reply, landing_page, tiles_balance, tiles_services};
use common::logger::TestLogger;
use common::portal::{self, BALANCE_PATH, LOGOUT_PATH, MockPortal, WELCOME_PATH};

const TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn full_run_signs_in_fetches_and_signs_out() {
    let log = TestLogger::new("full_run_signs_in_fetches_and_signs_out");
    log.phase("setup");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    mock.mount_logout(1).await;

    log.phase("execute");
    let report = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .expect("run should succeed");

    log.phase("verify");
    assert_eq!(report.balance["balance_PLN"], BalanceValue::Currency(12.34));
    assert_eq!(report.services["roaming"], BalanceValue::Flag(false));
    assert_eq!(
        report.services["no_data_limit_nights_recurring"],
        BalanceValue::Flag(true)
    );
    log.finish_ok();
}

#[tokio::test]
async fn selected_keys_are_applied_after_fetch() {
    let log = TestLogger::new("selected_keys_are_applied_after_fetch");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    mock.mount_logout(1).await;

    let mut options = mock.run_options(TIMEOUT);
    options.keys = vec!["balance_PLN".to_string()];
    let report = run(&options, &portal::credentials()).await.expect("run");

    assert_eq!(report.balance.len(), 1);
    assert!(report.services.is_empty());
    log.finish_ok();
}

#[tokio::test]
async fn keep_writes_raw_fragments() {
    let log = TestLogger::new("keep_writes_raw_fragments");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    mock.mount_logout(1).await;
    let dir = tempfile::tempdir().expect("tempdir");

    let mut options = mock.run_options(TIMEOUT);
    options.keep = Some(dir.path().join("raw"));
    run(&options, &portal::credentials()).await.expect("run");

    let saved = std::fs::read_to_string(dir.path().join("raw/balance.html")).expect("balance");
    assert_eq!(saved, tiles_balance());
    let saved = std::fs::read_to_string(dir.path().join("raw/services.html")).expect("services");
    assert_eq!(saved, tiles_services());
    log.finish_ok();
}

#[tokio::test]
async fn missing_logout_link_does_not_fail_the_run() {
    let log = TestLogger::new("missing_logout_link_does_not_fail_the_run");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(false).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    mock.mount_logout(0).await;

    let report = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .expect("run should succeed without logout");
    assert!(!report.is_empty());
    log.finish_ok();
}

#[tokio::test]
async fn bridge_session_id_is_cached_and_sent_as_cookie() {
    let log = TestLogger::new("bridge_session_id_is_cached_and_sent_as_cookie");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    // init mock expects exactly one call; the call mocks require the cookie
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;

    let mut session = Session::new(Portal::new(&mock.uri()).unwrap(), TIMEOUT).unwrap();
    session.login(&portal::credentials()).await.expect("login");
    let profile = play24::core::PortalVersion::Tiles.profile();
    let first = play24::core::bridge::call(&mut session, &profile.balance_call)
        .await
        .expect("balance");
    let second = play24::core::bridge::call(&mut session, &profile.services_call)
        .await
        .expect("services");

    assert_eq!(session.bridge_id(), Some(portal::BRIDGE_ID));
    assert_eq!(first, tiles_balance());
    assert_eq!(second, tiles_services());
    log.finish_ok();
}

#[tokio::test]
async fn landing_page_with_hidden_form_is_not_followed() {
    let log = TestLogger::new("landing_page_with_hidden_form_is_not_followed");
    log.phase("setup");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    let landing = landing_page(Some(LOGOUT_PATH)).replace(
        "</body>",
        r#"<form action="/Play24/lang" method="post"><input type="hidden" name="lang" value="en"><input type="submit" value="EN"></form></body>"#,
    );
    Mock::given(method("GET"))
        .and(path(WELCOME_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(landing, "text/html; charset=utf-8"))
        .with_priority(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Play24/lang"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock.server)
        .await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    mock.mount_logout(1).await;

    log.phase("execute");
    let report = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .expect("run should succeed");

    log.phase("verify");
    assert_eq!(report.balance["balance_PLN"], BalanceValue::Currency(12.34));
    log.finish_ok();
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn rejected_credentials_are_auth_error() {
    let log = TestLogger::new("rejected_credentials_are_auth_error");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;

    let err = run(
        &mock.run_options(TIMEOUT),
        &Credentials::new(portal::LOGIN, "wrong"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Play24Error::Auth(ref msg) if msg.contains("rejected")));
    assert_eq!(err.exit_code(), ExitCode::AuthError);
    log.finish_ok();
}

#[tokio::test]
async fn start_page_without_form_is_auth_error() {
    let log = TestLogger::new("start_page_without_form_is_auth_error");
    let mock = MockPortal::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Przerwa techniczna</p>"))
        .mount(&mock.server)
        .await;

    let err = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Auth(ref msg) if msg.contains("form not found")));
    log.finish_ok();
}

#[tokio::test]
async fn server_error_is_transport_error() {
    let log = TestLogger::new("server_error_is_transport_error");
    let mock = MockPortal::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock.server)
        .await;

    let err = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Transport { status: 500, .. }));
    assert_eq!(err.exit_code(), ExitCode::GeneralError);
    log.finish_ok();
}

#[tokio::test]
async fn slow_sign_on_times_out_as_auth_error() {
    let log = TestLogger::new("slow_sign_on_times_out_as_auth_error");
    let mock = MockPortal::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>...</p>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock.server)
        .await;

    let err = run(&mock.run_options(Duration::from_secs(1)), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Auth(ref msg) if msg.contains("within 1s")));
    log.finish_ok();
}

#[tokio::test]
async fn garbled_bridge_reply_is_protocol_error_and_still_logs_out() {
    let log = TestLogger::new("garbled_bridge_reply_is_protocol_error_and_still_logs_out");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    // higher priority than the well-formed balance reply
    Mock::given(method("POST"))
        .and(path(BALANCE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sesja wygasła</html>"))
        .with_priority(1)
        .mount(&mock.server)
        .await;
    mock.mount_logout(1).await;

    let err = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Protocol(_)));
    assert_eq!(err.exit_code(), ExitCode::ParseError);
    log.finish_ok();
}

#[tokio::test]
async fn payload_that_is_not_one_json_string_is_protocol_error() {
    let log = TestLogger::new("payload_that_is_not_one_json_string_is_protocol_error");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    mock.mount_bridge(&tiles_balance(), &tiles_services()).await;
    let body = bridge_reply("x").replace("\"x\"", "\"x\" + \"y\"");
    Mock::given(method("POST"))
        .and(path(BALANCE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .with_priority(1)
        .mount(&mock.server)
        .await;
    mock.mount_logout(1).await;

    let err = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Protocol(ref msg) if msg.contains("not a JSON string")));
    log.finish_ok();
}

#[tokio::test]
async fn unknown_label_in_fetched_fragment_fails_after_logout() {
    let log = TestLogger::new("unknown_label_in_fetched_fragment_fails_after_logout");
    let mock = MockPortal::start().await;
    mock.mount_sign_on(true).await;
    let services = tiles_services().replace("Roaming zagraniczny", "Roaming 5G");
    mock.mount_bridge(&tiles_balance(), &services).await;
    mock.mount_logout(1).await;

    let err = run(&mock.run_options(TIMEOUT), &portal::credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, Play24Error::Lookup(_)));
    log.finish_ok();
}
