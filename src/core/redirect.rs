//! Form-redirection follower.
//!
//! The portal's single sign-on handshake bounces through pages whose only job
//! is to auto-submit a hidden form. Without a script engine we submit those
//! forms ourselves, carrying every input forward.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::core::http::{self, Page};
use crate::error::{Play24Error, Result};

static FORM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").expect("valid selector"));
static INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input").expect("valid selector"));

/// A form ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Action resolved against the page URL.
    pub action: Url,
    /// Input name/value pairs in document order; a later input with the same
    /// name replaced the earlier value.
    pub fields: Vec<(String, String)>,
    /// Whether any input is something a user would type into.
    pub has_visible_inputs: bool,
}

impl Form {
    fn from_element(form: ElementRef<'_>, base: &Url) -> Result<Self> {
        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => base
                .join(action)
                .map_err(|e| Play24Error::Auth(format!("bad form action '{action}': {e}")))?,
            _ => base.clone(),
        };

        let mut fields: Vec<(String, String)> = Vec::new();
        let mut has_visible_inputs = false;
        for input in form.select(&INPUT) {
            let element = input.value();
            let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
            if !matches!(kind.as_str(), "hidden" | "submit") {
                has_visible_inputs = true;
            }
            let Some(name) = element.attr("name") else {
                continue;
            };
            let value = element.attr("value").unwrap_or_default().to_string();
            match fields.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value,
                None => fields.push((name.to_string(), value)),
            }
        }

        Ok(Self {
            action,
            fields,
            has_visible_inputs,
        })
    }

    /// The first form on the page.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Auth`] if the action cannot be resolved.
    pub fn first(page: &Page) -> Result<Option<Self>> {
        let document = Html::parse_document(&page.body);
        document
            .select(&FORM)
            .next()
            .map(|form| Self::from_element(form, &page.url))
            .transpose()
    }

    /// The first form containing an input matched by `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Auth`] if the action cannot be resolved.
    pub fn containing(page: &Page, selector: &Selector) -> Result<Option<Self>> {
        let document = Html::parse_document(&page.body);
        document
            .select(&FORM)
            .find(|form| form.select(selector).next().is_some())
            .map(|form| Self::from_element(form, &page.url))
            .transpose()
    }

    /// Set a field, replacing an existing value of the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

/// Whether the page is an auto-submitting bounce page: it has a form and the
/// form offers nothing to type into.
///
/// # Errors
///
/// Returns [`Play24Error::Auth`] if the form action cannot be resolved.
pub fn is_bounce_page(page: &Page) -> Result<bool> {
    Ok(Form::first(page)?.is_some_and(|form| !form.has_visible_inputs))
}

/// Submit the page's first form and return the next page.
///
/// Callers loop on this until they reach a terminal page.
///
/// # Errors
///
/// Returns [`Play24Error::Auth`] when the page has no form, or a transport
/// error when the POST fails.
pub async fn follow(client: &Client, page: &Page, timeout: Duration) -> Result<Page> {
    let form = Form::first(page)?
        .ok_or_else(|| Play24Error::Auth(format!("no form to follow on {}", page.url)))?;
    tracing::debug!(from = %page.url, to = %form.action, "following bounce form");
    http::post_form(client, &form.action, &form.fields, timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Page {
        Page {
            url: Url::parse("https://login.example.com/sso/UI/Login?realm=play").unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn bounce_form_collects_hidden_inputs() {
        let p = page(
            r#"<body onload="document.forms[0].submit()">
              <form method="post" action="/sso/Consumer">
                <input type="hidden" name="SAMLResponse" value="abc">
                <input type="hidden" name="RelayState" value="xyz">
                <input type="submit" value="Continue">
              </form></body>"#,
        );
        let form = Form::first(&p).unwrap().unwrap();
        assert_eq!(form.action.as_str(), "https://login.example.com/sso/Consumer");
        assert_eq!(
            form.fields,
            vec![
                ("SAMLResponse".to_string(), "abc".to_string()),
                ("RelayState".to_string(), "xyz".to_string()),
            ]
        );
        assert!(is_bounce_page(&p).unwrap());
    }

    #[test]
    fn later_inputs_overwrite_earlier() {
        let p = page(
            r#"<form action="next"><input type="hidden" name="goto" value="a">
               <input type="hidden" name="goto" value="b"></form>"#,
        );
        let form = Form::first(&p).unwrap().unwrap();
        assert_eq!(form.fields, vec![("goto".to_string(), "b".to_string())]);
        assert_eq!(form.action.as_str(), "https://login.example.com/sso/UI/next");
    }

    #[test]
    fn missing_action_posts_to_current_url() {
        let p = page(r#"<form><input type="hidden" name="a" value="1"></form>"#);
        let form = Form::first(&p).unwrap().unwrap();
        assert_eq!(form.action, p.url);
    }

    #[test]
    fn login_form_is_not_a_bounce() {
        let p = page(
            r#"<form action="/sso/UI/Login">
                 <input type="hidden" name="goto" value="x">
                 <input name="IDToken1"><input type="password" name="IDToken2">
               </form>"#,
        );
        assert!(!is_bounce_page(&p).unwrap());
    }

    #[test]
    fn page_without_form() {
        let p = page("<p>Welcome</p>");
        assert!(Form::first(&p).unwrap().is_none());
        assert!(!is_bounce_page(&p).unwrap());
    }

    #[test]
    fn set_replaces_or_appends() {
        let p = page(r#"<form><input type="hidden" name="IDToken1" value=""></form>"#);
        let mut form = Form::first(&p).unwrap().unwrap();
        form.set("IDToken1", "user");
        form.set("IDToken2", "secret");
        assert_eq!(
            form.fields,
            vec![
                ("IDToken1".to_string(), "user".to_string()),
                ("IDToken2".to_string(), "secret".to_string()),
            ]
        );
    }
}
