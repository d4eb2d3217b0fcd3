//! Markup extraction.
//!
//! Walks an HTML fragment with an [`ExtractionRule`] and produces a map from
//! row label (optionally paired with a recurring flag) to the raw value text.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Play24Error, Result};

/// Where a selector is evaluated relative to its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Direct children of the row only.
    Child(&'static str),
    /// Any descendant of the row.
    Descendant(&'static str),
}

impl Lookup {
    fn selector(self) -> &'static str {
        match self {
            Self::Child(selector) | Self::Descendant(selector) => selector,
        }
    }

    fn first<'a>(self, row: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
        match self {
            Self::Child(_) => row
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| selector.matches(child)),
            Self::Descendant(_) => row.select(selector).next(),
        }
    }
}

/// Detects a marker inside a row, e.g. a "monthly" badge on a service tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRule {
    pub selector: &'static str,
    /// When set, a matched node only counts if its text contains this.
    pub contains: Option<&'static str>,
}

/// Declarative description of one table-like structure in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    /// Selects every row in the document.
    pub row: &'static str,
    pub label: Lookup,
    pub value: Lookup,
    pub flag: Option<FlagRule>,
    /// A row without label or value node yields `""` instead of failing.
    pub allow_empty: bool,
}

/// Key of an extracted row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawKey {
    pub label: String,
    /// Present only when the rule has a [`FlagRule`].
    pub flag: Option<bool>,
}

impl RawKey {
    #[must_use]
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            flag: None,
        }
    }

    #[must_use]
    pub fn flagged(label: impl Into<String>, flag: bool) -> Self {
        Self {
            label: label.into(),
            flag: Some(flag),
        }
    }
}

impl std::fmt::Display for RawKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.flag {
            Some(flag) => write!(f, "{} (recurring: {flag})", self.label),
            None => f.write_str(&self.label),
        }
    }
}

/// Raw label to raw value text.
pub type RawMap = BTreeMap<RawKey, String>;

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Play24Error::Config(format!("invalid selector '{selector}': {e}")))
}

/// Concatenated, trimmed text of a node and its descendants.
fn text_content(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Extract every row matched by `rule` from `html`.
///
/// Later rows with the same key overwrite earlier ones.
///
/// # Errors
///
/// Returns [`Play24Error::Extraction`] when a row lacks its label or value
/// node and the rule does not allow empty values.
pub fn extract(html: &str, rule: &ExtractionRule) -> Result<RawMap> {
    let document = Html::parse_document(html);
    let rows = compile(rule.row)?;
    let label_selector = compile(rule.label.selector())?;
    let value_selector = compile(rule.value.selector())?;
    let flag = rule
        .flag
        .map(|flag| compile(flag.selector).map(|selector| (selector, flag.contains)))
        .transpose()?;

    let mut mapping = RawMap::new();
    for row in document.select(&rows) {
        let label = match rule.label.first(row, &label_selector) {
            Some(node) => text_content(node),
            None if rule.allow_empty => String::new(),
            None => {
                return Err(Play24Error::Extraction {
                    label: "<missing label>".to_string(),
                });
            }
        };

        let value = match rule.value.first(row, &value_selector) {
            Some(node) => first_line(&text_content(node)).trim().to_string(),
            None if rule.allow_empty => String::new(),
            None => return Err(Play24Error::Extraction { label }),
        };

        let key = RawKey {
            flag: flag.as_ref().map(|(selector, contains)| {
                row.select(selector).any(|node| {
                    contains.is_none_or(|needle| node.text().collect::<String>().contains(needle))
                })
            }),
            label,
        };

        if let Some(previous) = mapping.get(&key) {
            tracing::debug!(%key, previous = %previous, "duplicate row overrides earlier value");
        }
        mapping.insert(key, value);
    }

    tracing::debug!(rows = mapping.len(), selector = rule.row, "extracted rows");
    Ok(mapping)
}
