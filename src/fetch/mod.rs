//! Page fetchers for the two upstream sources.

pub mod finmarket;
pub mod iban;
pub mod util;

use crate::core::currency::Currency;
use crate::core::date::DateRange;
use crate::core::model::CountryCurrency;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub const USER_AGENT: &str = concat!("kursview/", env!("CARGO_PKG_VERSION"));

/// One scraped archive row: the trading date and the rate as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRow {
    pub date: NaiveDate,
    pub rate: String,
}

/// Fetches the country/currency-code table.
#[async_trait]
pub trait CodeTableProvider: Send + Sync {
    /// Rows without an ISO code are dropped; the result is sorted by
    /// country. Network failures, a missing table, and header drift
    /// all propagate as errors.
    async fn fetch_codes(&self) -> Result<Vec<CountryCurrency>>;
}

/// Fetches the per-currency rate archive.
#[async_trait]
pub trait RateArchiveProvider: Send + Sync {
    /// Archive rows for one currency over a date range, oldest first.
    async fn fetch_currency(&self, currency: Currency, range: DateRange) -> Result<Vec<RateRow>>;
}
