//! Label dispatch: raw portal labels to canonical keys and typed values.

use crate::core::extract::{RawKey, RawMap};
use crate::core::models::ValueMap;
use crate::core::parsers::ValueParser;
use crate::error::{Play24Error, Result};

/// One row of a label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelEntry {
    /// Display label as it appears in the markup.
    pub label: &'static str,
    /// Recurring flag for flagged rules; `None` for plain rows.
    pub flag: Option<bool>,
    /// Canonical output key.
    pub key: &'static str,
    pub parser: ValueParser,
}

impl LabelEntry {
    #[must_use]
    pub const fn plain(label: &'static str, key: &'static str, parser: ValueParser) -> Self {
        Self {
            label,
            flag: None,
            key,
            parser,
        }
    }

    /// A boolean service tile entry.
    #[must_use]
    pub const fn tile(label: &'static str, recurring: bool, key: &'static str) -> Self {
        Self {
            label,
            flag: Some(recurring),
            key,
            parser: ValueParser::Boolean,
        }
    }

    fn matches(&self, raw: &RawKey) -> bool {
        self.label == raw.label && self.flag == raw.flag
    }
}

/// Find the entry for an extracted key.
#[must_use]
pub fn lookup<'t>(table: &'t [LabelEntry], raw: &RawKey) -> Option<&'t LabelEntry> {
    table.iter().find(|entry| entry.matches(raw))
}

/// Turn every extracted row into a canonical key and typed value.
///
/// # Errors
///
/// Fails with [`Play24Error::Lookup`] on the first label not in `table`, or
/// with whatever the entry's parser reports for a malformed value.
pub fn dispatch(raw: &RawMap, table: &[LabelEntry]) -> Result<ValueMap> {
    raw.iter()
        .map(|(key, value)| {
            let entry =
                lookup(table, key).ok_or_else(|| Play24Error::Lookup(key.to_string()))?;
            let parsed = entry.parser.parse(value)?;
            tracing::trace!(label = %key, key = entry.key, "dispatched");
            Ok((entry.key.to_string(), parsed))
        })
        .collect()
}
