//! Output filter: restrict a report to caller-selected keys.

use crate::core::models::{Report, ValueMap};
use crate::error::{Play24Error, Result};

/// Keep only `keys`, each copied into the map it came from.
///
/// An empty key list returns both maps unchanged.
///
/// # Errors
///
/// Returns [`Play24Error::InvalidKey`] for a key found in neither map.
pub fn filter_output<S: AsRef<str>>(
    balance: &ValueMap,
    services: &ValueMap,
    keys: &[S],
) -> Result<(ValueMap, ValueMap)> {
    if keys.is_empty() {
        return Ok((balance.clone(), services.clone()));
    }

    let mut out_balance = ValueMap::new();
    let mut out_services = ValueMap::new();
    for key in keys {
        let key = key.as_ref();
        if let Some(value) = balance.get(key) {
            out_balance.insert(key.to_string(), value.clone());
        } else if let Some(value) = services.get(key) {
            out_services.insert(key.to_string(), value.clone());
        } else {
            return Err(Play24Error::InvalidKey(key.to_string()));
        }
    }
    Ok((out_balance, out_services))
}

/// [`filter_output`] over a whole [`Report`].
///
/// # Errors
///
/// Returns [`Play24Error::InvalidKey`] for a key found in neither map.
pub fn filter_report<S: AsRef<str>>(report: &Report, keys: &[S]) -> Result<Report> {
    let (balance, services) = filter_output(&report.balance, &report.services, keys)?;
    Ok(Report::new(balance, services))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BalanceValue;

    fn sample() -> (ValueMap, ValueMap) {
        let mut balance = ValueMap::new();
        balance.insert("balance_PLN".into(), BalanceValue::Currency(12.34));
        balance.insert("SMS_all_count".into(), BalanceValue::Quantity(100));
        let mut services = ValueMap::new();
        services.insert("roaming".into(), BalanceValue::Flag(true));
        services.insert("extend_7days".into(), BalanceValue::Flag(false));
        (balance, services)
    }

    #[test]
    fn empty_key_set_is_identity() {
        let (balance, services) = sample();
        let keys: [&str; 0] = [];
        let (b, s) = filter_output(&balance, &services, &keys).unwrap();
        assert_eq!(b, balance);
        assert_eq!(s, services);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let (balance, services) = sample();
        let err = filter_output(&balance, &services, &["balance_PLN", "nope"]).unwrap_err();
        assert!(matches!(err, Play24Error::InvalidKey(key) if key == "nope"));
    }

    #[test]
    fn mixed_keys_partition_across_maps() {
        let (balance, services) = sample();
        let (b, s) = filter_output(&balance, &services, &["roaming", "balance_PLN"]).unwrap();

        assert_eq!(b.len(), 1);
        assert_eq!(b["balance_PLN"], BalanceValue::Currency(12.34));
        assert_eq!(s.len(), 1);
        assert_eq!(s["roaming"], BalanceValue::Flag(true));
        assert!(b.keys().all(|k| !s.contains_key(k)));
    }

    #[test]
    fn filter_report_wraps_maps() {
        let (balance, services) = sample();
        let report = Report::new(balance, services);
        let filtered = filter_report(&report, &["extend_7days".to_string()]).unwrap();
        assert!(filtered.balance.is_empty());
        assert_eq!(filtered.services.len(), 1);
    }
}
