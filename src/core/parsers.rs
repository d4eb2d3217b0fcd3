//! Value parsers for raw portal strings.
//!
//! Each parser matches a lexical form anchored at the start of the string and
//! ignores whatever trails it.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::core::models::BalanceValue;
use crate::error::{Play24Error, Result};

/// Raw value of an active service tile.
pub const ENABLED: &str = "W\u{142}\u{105}czony";

static CURRENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<int>[0-9]+)(?:,(?P<fract>[0-9]{2}))? z\x{142}").expect("valid regex")
});

static DATA_CAP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<int>[0-9]+)(?:,(?P<fract>[0-9]+))? (?P<unit>GB|MB)").expect("valid regex")
});

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}$").expect("valid regex"));

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hours>[0-9]+):(?P<minutes>[0-9]{2}) min").expect("valid regex")
});

static QUANTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<int>[0-9]+) szt\.").expect("valid regex"));

/// A parser turning one raw string into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueParser {
    Currency,
    Date,
    DataCap,
    Duration,
    Quantity,
    Boolean,
    Text,
}

impl ValueParser {
    /// Apply this parser to a raw string.
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Parse`] when the string does not match, or
    /// [`Play24Error::Lookup`] for a boolean state outside the known table.
    pub fn parse(self, raw: &str) -> Result<BalanceValue> {
        match self {
            Self::Currency => parse_currency(raw).map(BalanceValue::Currency),
            Self::Date => parse_date(raw).map(BalanceValue::Date),
            Self::DataCap => parse_data_cap(raw).map(BalanceValue::DataCap),
            Self::Duration => parse_duration(raw).map(BalanceValue::Minutes),
            Self::Quantity => parse_quantity(raw).map(BalanceValue::Quantity),
            Self::Boolean => parse_boolean_state(raw).map(BalanceValue::Flag),
            Self::Text => Ok(BalanceValue::Text(raw.to_string())),
        }
    }
}

/// `"12,34 zł"` -> `12.34`.
pub fn parse_currency(raw: &str) -> Result<f64> {
    let caps = CURRENCY_REGEX
        .captures(raw)
        .ok_or_else(|| Play24Error::parse("balance", raw))?;
    combine_float(&caps, raw, "balance")
}

/// `"31.12.2024"` -> 2024-12-31.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    if !DATE_REGEX.is_match(raw) {
        return Err(Play24Error::parse("date", raw));
    }
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").map_err(|_| Play24Error::parse("date", raw))
}

/// `"1,5 GB"` -> `1.5`, `"500 MB"` -> `0.5`.
pub fn parse_data_cap(raw: &str) -> Result<f64> {
    let caps = DATA_CAP_REGEX
        .captures(raw)
        .ok_or_else(|| Play24Error::parse("data cap", raw))?;
    let value = combine_float(&caps, raw, "data cap")?;
    if &caps["unit"] == "MB" {
        Ok(value / 1000.0)
    } else {
        Ok(value)
    }
}

/// `"2:05 min"` -> `125` minutes.
pub fn parse_duration(raw: &str) -> Result<u32> {
    let caps = DURATION_REGEX
        .captures(raw)
        .ok_or_else(|| Play24Error::parse("duration", raw))?;
    let hours: u32 = caps["hours"]
        .parse()
        .map_err(|_| Play24Error::parse("duration", raw))?;
    let minutes: u32 = caps["minutes"]
        .parse()
        .map_err(|_| Play24Error::parse("duration", raw))?;
    if minutes >= 60 {
        return Err(Play24Error::parse("duration", raw));
    }
    hours
        .checked_mul(60)
        .and_then(|total| total.checked_add(minutes))
        .ok_or_else(|| Play24Error::parse("duration", raw))
}

/// `"100 szt."` -> `100`.
pub fn parse_quantity(raw: &str) -> Result<u64> {
    let caps = QUANTITY_REGEX
        .captures(raw)
        .ok_or_else(|| Play24Error::parse("quantity", raw))?;
    caps["int"]
        .parse()
        .map_err(|_| Play24Error::parse("quantity", raw))
}

/// Closed table: empty -> inactive, [`ENABLED`] -> active.
pub fn parse_boolean_state(raw: &str) -> Result<bool> {
    match raw {
        "" => Ok(false),
        ENABLED => Ok(true),
        other => Err(Play24Error::Lookup(format!("service state '{other}'"))),
    }
}

fn combine_float(caps: &Captures<'_>, raw: &str, kind: &'static str) -> Result<f64> {
    let number = caps.name("fract").map_or_else(
        || caps["int"].to_string(),
        |fract| format!("{}.{}", &caps["int"], fract.as_str()),
    );
    number.parse().map_err(|_| Play24Error::parse(kind, raw))
}
