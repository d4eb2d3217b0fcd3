//! Remote-call bridge emulation.
//!
//! The portal's pages fetch their fragments through a legacy AJAX bridge: a
//! POST with a newline-delimited `key=value` body, answered by a script that
//! invokes a callback with the result. We speak that protocol directly
//! instead of running the page scripts.
//!
//! The bridge session id is requested once per run (`__System.generateId`),
//! cached on the [`Session`] and mirrored into a cookie. Every call then
//! carries a freshly derived script-session token.

pub mod token;

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::core::http;
use crate::core::profile::BridgeMethod;
use crate::core::session::Session;
use crate::error::{Play24Error, Result};

pub use token::{fresh_session_token, session_token, tokenify};

/// Cookie carrying the bridge session id.
pub const SESSION_COOKIE: &str = "DWRSESSIONID";

const INIT_SCRIPT: &str = "__System";
const INIT_METHOD: &str = "generateId";

/// Reply envelope preceding the JSON-encoded fragment of a successful call.
pub const REPLY_PREFIX: &str = "throw 'allowScriptTagRemoting is false.';\n\
(function(){\n\
var r=window.dwr._[0];\n\
//#DWR-INSERT\n\
//#DWR-REPLY\n\
r.handleCallback(\"0\",\"0\",{status:\"SUCCESS\",view:";

/// Reply envelope following the fragment.
pub const REPLY_SUFFIX: &str = "});\n})();";

static INIT_REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"handleCallback\("[^"]*",\s*"[^"]*",\s*"([^"]+)"\);"#).expect("valid regex")
});

static CALL_REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?s){}(\".*\"){}",
        regex::escape(REPLY_PREFIX),
        regex::escape(REPLY_SUFFIX)
    ))
    .expect("valid regex")
});

/// One remote procedure invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCall<'a> {
    pub script: &'a str,
    pub method: &'a str,
    pub params: &'a [&'a str],
    /// Path of the page the call claims to come from.
    pub page: &'a str,
    pub session_token: String,
}

impl<'a> BridgeCall<'a> {
    /// The session-id request; it carries an empty token.
    #[must_use]
    pub const fn init(page: &'a str) -> Self {
        Self {
            script: INIT_SCRIPT,
            method: INIT_METHOD,
            params: &[],
            page,
            session_token: String::new(),
        }
    }

    #[must_use]
    pub const fn new(method: &'a BridgeMethod, page: &'a str, session_token: String) -> Self {
        Self {
            script: method.script,
            method: method.method,
            params: method.params,
            page,
            session_token,
        }
    }

    /// Plain-call body: one `key=value` line per parameter.
    #[must_use]
    pub fn encode(&self) -> String {
        let page: String = url::form_urlencoded::byte_serialize(self.page.as_bytes()).collect();
        let mut body = String::new();
        let mut line = |key: &str, value: &str| {
            // writing to a String cannot fail
            let _ = writeln!(body, "{key}={value}");
        };
        line("callCount", "1");
        line("nextReverseAjaxIndex", "0");
        line("c0-scriptName", self.script);
        line("c0-methodName", self.method);
        line("c0-id", "0");
        for (i, param) in self.params.iter().enumerate() {
            line(&format!("c0-param{i}"), param);
        }
        line("batchId", "0");
        line("instanceId", "0");
        line("page", &page);
        line("scriptSessionId", &self.session_token);
        body
    }
}

/// Extract the session id from a `generateId` reply.
///
/// # Errors
///
/// Returns [`Play24Error::Protocol`] if no callback invocation is found.
pub fn parse_init_reply(body: &str) -> Result<String> {
    INIT_REPLY
        .captures(body)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Play24Error::Protocol("session id not found in init reply".to_string()))
}

/// Extract the fragment from a call reply.
///
/// # Errors
///
/// Returns [`Play24Error::Protocol`] if the envelope is not found verbatim or
/// its payload is not a single JSON string.
pub fn parse_call_reply(body: &str) -> Result<String> {
    let caps = CALL_REPLY
        .captures(body)
        .ok_or_else(|| Play24Error::Protocol("reply envelope not found".to_string()))?;
    serde_json::from_str::<String>(&caps[1])
        .map_err(|e| Play24Error::Protocol(format!("reply payload is not a JSON string: {e}")))
}

/// Request a new bridge session id.
///
/// # Errors
///
/// Returns a transport error on failure or [`Play24Error::Protocol`] on an
/// unexpected reply.
pub async fn init(session: &Session) -> Result<String> {
    let call = BridgeCall::init(session.portal().page_path());
    let url = session.portal().bridge_url(call.script, call.method)?;
    let page = http::post_plain(session.client(), &url, call.encode(), session.timeout()).await?;
    parse_init_reply(&page.body)
}

/// The cached bridge session id, initialising it on first use.
///
/// # Errors
///
/// Propagates [`init`] failures.
pub async fn ensure_session(session: &mut Session) -> Result<String> {
    if let Some(id) = session.bridge_id() {
        return Ok(id.to_string());
    }
    let id = init(session).await?;
    session.add_cookie(&format!("{SESSION_COOKIE}={id}; Path=/"));
    session.set_bridge_id(id.clone());
    tracing::info!("bridge session established");
    Ok(id)
}

/// Invoke a remote method and return the HTML fragment it renders.
///
/// # Errors
///
/// Returns a transport error on failure or [`Play24Error::Protocol`] on an
/// unexpected reply.
pub async fn call(session: &mut Session, method: &BridgeMethod) -> Result<String> {
    let id = ensure_session(session).await?;
    let call = BridgeCall::new(method, session.portal().page_path(), fresh_session_token(&id));
    let url: Url = session.portal().bridge_url(call.script, call.method)?;
    tracing::debug!(script = call.script, method = call.method, "bridge call");
    let page = http::post_plain(session.client(), &url, call.encode(), session.timeout()).await?;
    parse_call_reply(&page.body)
}
