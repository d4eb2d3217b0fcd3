//! Fixture loading and bridge reply builders.
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use play24::core::bridge::{REPLY_PREFIX, REPLY_SUFFIX};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Load a fixture file as a string.
///
/// # Panics
///
/// Panics if the fixture is missing.
#[must_use]
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

#[must_use]
pub fn tiles_balance() -> String {
    load_fixture("tiles_balance.html")
}

#[must_use]
pub fn tiles_services() -> String {
    load_fixture("tiles_services.html")
}

/// A successful bridge call reply rendering `html`.
#[must_use]
pub fn bridge_reply(html: &str) -> String {
    format!(
        "{REPLY_PREFIX}{}{REPLY_SUFFIX}\n",
        serde_json::Value::String(html.to_string())
    )
}

/// A `generateId` reply handing out `id`.
#[must_use]
pub fn init_reply(id: &str) -> String {
    format!(
        "throw 'allowScriptTagRemoting is false.';\n(function(){{\n\
         var r=window.dwr._[0];\n//#DWR-INSERT\n//#DWR-REPLY\n\
         r.handleCallback(\"0\",\"0\",\"{id}\");\n}})();\n"
    )
}

/// Auto-submitting hand-off page posting to `action`.
#[must_use]
pub fn bounce_page(action: &str) -> String {
    format!(
        r#"<html><body onload="document.forms[0].submit()">
<form method="post" action="{action}">
  <input type="hidden" name="goto" value="https://24.play.pl/Play24/Welcome">
  <input type="hidden" name="realm" value="play">
  <input type="submit" value="Dalej">
</form></body></html>"#
    )
}

/// Sign-on page with both credential inputs.
#[must_use]
pub fn login_page(action: &str) -> String {
    format!(
        r#"<html><head><title>Logowanie</title></head><body>
<form name="Login" method="post" action="{action}">
  <input type="text" name="IDToken1" value="">
  <input type="password" name="IDToken2" value="">
  <input type="hidden" name="goto" value="https://24.play.pl/Play24/Welcome">
  <button type="submit" name="Login.Submit">Zaloguj</button>
</form></body></html>"#
    )
}

/// Authenticated landing page; `logout` adds the sign-out link.
#[must_use]
pub fn landing_page(logout: Option<&str>) -> String {
    let link = logout
        .map(|href| format!(r#"<a id="ssoLogout" href="{href}">Wyloguj</a>"#))
        .unwrap_or_default();
    format!(
        r##"<html><head><title>Play24</title></head><body>
<nav>{link}</nav>
<div id="accountBallances"><a href="#">Stan konta</a></div>
</body></html>"##
    )
}
