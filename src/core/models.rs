//! Report data model.
//!
//! A scrape produces two flat maps from canonical key to typed value: one for
//! the balance modal and one for the service tiles.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// A typed value parsed out of the portal markup.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceValue {
    /// Free text, kept verbatim.
    Text(String),
    /// Money in PLN.
    Currency(f64),
    /// Data allowance normalized to GB.
    DataCap(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Duration in minutes.
    Minutes(u32),
    /// Unit count.
    Quantity(u64),
    /// Service state.
    Flag(bool),
}

impl BalanceValue {
    /// The boolean payload, if this is a [`BalanceValue::Flag`].
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// The float payload of currency and data-cap values.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Currency(value) | Self::DataCap(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for BalanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Currency(value) | Self::DataCap(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Minutes(value) => write!(f, "{value}"),
            Self::Quantity(value) => write!(f, "{value}"),
            Self::Flag(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for BalanceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Currency(value) | Self::DataCap(value) => serializer.serialize_f64(*value),
            Self::Date(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            Self::Minutes(value) => serializer.serialize_u32(*value),
            Self::Quantity(value) => serializer.serialize_u64(*value),
            Self::Flag(value) => serializer.serialize_bool(*value),
        }
    }
}

/// Canonical key to typed value.
pub type ValueMap = BTreeMap<String, BalanceValue>;

/// The result of one run. Built once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub balance: ValueMap,
    pub services: ValueMap,
}

impl Report {
    #[must_use]
    pub const fn new(balance: ValueMap, services: ValueMap) -> Self {
        Self { balance, services }
    }

    /// Balance entries followed by service entries.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &BalanceValue)> {
        self.balance.iter().chain(self.services.iter())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balance.is_empty() && self.services.is_empty()
    }
}
