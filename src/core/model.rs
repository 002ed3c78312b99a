//! Persisted data types.

use super::currency::Currency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the country/currency-code table. Unique by country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCurrency {
    pub country: String,
    pub currency: String,
    pub code: String,
    pub number: String,
}

impl CountryCurrency {
    /// The tracked currency this country maps to, if any.
    pub fn tracked(&self) -> Option<Currency> {
        Currency::from_code(&self.code)
    }
}

/// One day's recorded rates against the ruble. Unique by date.
///
/// Rates are kept exactly as scraped (decimal comma and all) and parsed
/// at computation time. A snapshot may be partial when some currency
/// pages failed to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub rates: BTreeMap<Currency, String>,
}

impl RateSnapshot {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rates: BTreeMap::new(),
        }
    }

    pub fn rate(&self, currency: Currency) -> Option<&str> {
        self.rates.get(&currency).map(String::as_str)
    }

    pub fn set_rate(&mut self, currency: Currency, raw: String) {
        self.rates.insert(currency, raw);
    }
}

/// Relative change of one currency on one date against the baseline
/// date, in percent. Unique by (date, currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateChange {
    pub currency: Currency,
    pub date: NaiveDate,
    pub relative_change: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_lookup() {
        let row = CountryCurrency {
            country: "Япония".to_string(),
            currency: "Иена".to_string(),
            code: "JPY".to_string(),
            number: "392".to_string(),
        };
        assert_eq!(row.tracked(), Some(Currency::Jpy));

        let untracked = CountryCurrency {
            code: "AUD".to_string(),
            ..row
        };
        assert_eq!(untracked.tracked(), None);
    }

    #[test]
    fn test_snapshot_accessor() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut snapshot = RateSnapshot::new(date);
        assert_eq!(snapshot.rate(Currency::Usd), None);

        snapshot.set_rate(Currency::Usd, "89,0214".to_string());
        assert_eq!(snapshot.rate(Currency::Usd), Some("89,0214"));
        assert_eq!(snapshot.rate(Currency::Eur), None);
    }
}
