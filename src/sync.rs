//! Orchestration: fetch pages, upsert rows, recompute changes.
//!
//! Fetchers always propagate their failures; this layer is where a
//! failure turns into a logged skip so one broken upstream page does
//! not abort a whole sync.

use crate::chart::{ChartSeries, SeriesPoint};
use crate::core::change::{ChangeSummary, recompute_changes};
use crate::core::currency::Currency;
use crate::core::date::DateRange;
use crate::core::model::{CountryCurrency, RateSnapshot};
use crate::fetch::{CodeTableProvider, RateArchiveProvider};
use crate::store::{RateStore, UpsertOutcome};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct CodesSyncOutcome {
    pub rows: Vec<CountryCurrency>,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Fetches the code table and upserts every row by country.
pub async fn sync_country_codes(
    provider: &dyn CodeTableProvider,
    store: &RateStore,
) -> Result<CodesSyncOutcome> {
    let rows = provider.fetch_codes().await?;

    let mut outcome = CodesSyncOutcome::default();
    for row in &rows {
        match store.codes().upsert(row.country.clone(), row.clone()) {
            UpsertOutcome::Inserted => outcome.inserted += 1,
            UpsertOutcome::Updated => outcome.updated += 1,
            UpsertOutcome::Unchanged => outcome.unchanged += 1,
        }
    }
    info!(
        total = rows.len(),
        inserted = outcome.inserted,
        updated = outcome.updated,
        "country code table synced"
    );
    outcome.rows = rows;
    Ok(outcome)
}

#[derive(Debug, Default)]
pub struct RatesSyncOutcome {
    /// Snapshots stored for the range, oldest first, after merging
    /// with anything already on record for the same dates.
    pub snapshots: Vec<RateSnapshot>,
    /// Currencies whose archive page could not be fetched this run.
    pub skipped: Vec<Currency>,
    pub changes: ChangeSummary,
}

/// Fetches the rate archive for every tracked currency, stores the
/// pivoted per-date snapshots, and recomputes relative changes against
/// the earliest date of the fetched frame.
pub async fn sync_rates(
    provider: &dyn RateArchiveProvider,
    store: &RateStore,
    range: DateRange,
) -> Result<RatesSyncOutcome> {
    let fetches = Currency::ALL
        .map(|currency| async move { (currency, provider.fetch_currency(currency, range).await) });
    let results = join_all(fetches).await;

    let mut frame: BTreeMap<NaiveDate, Vec<(Currency, String)>> = BTreeMap::new();
    let mut skipped = Vec::new();
    for (currency, result) in results {
        match result {
            Ok(rows) => {
                for row in rows {
                    if !range.contains(row.date) {
                        continue;
                    }
                    frame.entry(row.date).or_default().push((currency, row.rate));
                }
            }
            Err(e) => {
                warn!(currency = %currency, error = %e, "rate archive fetch failed, skipping currency");
                skipped.push(currency);
            }
        }
    }

    let mut snapshots = Vec::with_capacity(frame.len());
    for (date, rates) in frame {
        let mut snapshot = store
            .snapshots()
            .get(&date)
            .unwrap_or_else(|| RateSnapshot::new(date));
        for (currency, rate) in rates {
            snapshot.set_rate(currency, rate);
        }
        store.snapshots().upsert(date, snapshot.clone());
        snapshots.push(snapshot);
    }

    let changes = match snapshots.first() {
        Some(baseline) => {
            let summary = recompute_changes(store, baseline.date);
            info!(
                baseline = %baseline.date,
                snapshots = snapshots.len(),
                written = summary.written(),
                skipped_currencies = skipped.len(),
                "rate snapshots synced"
            );
            summary
        }
        None => {
            warn!("rate sync produced no snapshots");
            ChangeSummary::default()
        }
    };

    Ok(RatesSyncOutcome {
        snapshots,
        skipped,
        changes,
    })
}

/// Builds one change series per selected country from stored data.
///
/// Countries with no code-table row, or whose code is not a tracked
/// currency, land in the second return value instead of failing the
/// whole request.
pub fn change_series(
    store: &RateStore,
    countries: &[String],
    range: DateRange,
) -> (Vec<ChartSeries>, Vec<String>) {
    let changes = store.changes().scan();

    let mut series = Vec::new();
    let mut missing = Vec::new();
    for country in countries {
        let tracked = store.codes().get(country).and_then(|row| row.tracked());
        let Some(currency) = tracked else {
            missing.push(country.clone());
            continue;
        };

        // `scan` is (date, currency)-ordered, so the filtered points
        // are already oldest first.
        let points: Vec<SeriesPoint> = changes
            .iter()
            .filter(|((date, c), _)| *c == currency && range.contains(*date))
            .map(|(_, change)| SeriesPoint {
                date: change.date,
                value: change.relative_change,
            })
            .collect();
        series.push(ChartSeries {
            label: country.clone(),
            points,
        });
    }
    (series, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RateRow;
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange {
            start: date(3),
            end: date(5),
        }
    }

    struct StubCodes(Vec<CountryCurrency>);

    #[async_trait]
    impl CodeTableProvider for StubCodes {
        async fn fetch_codes(&self) -> Result<Vec<CountryCurrency>> {
            Ok(self.0.clone())
        }
    }

    /// Serves fixed rows for USD and EUR, errors for everything else.
    struct StubArchive;

    #[async_trait]
    impl RateArchiveProvider for StubArchive {
        async fn fetch_currency(
            &self,
            currency: Currency,
            _range: DateRange,
        ) -> Result<Vec<RateRow>> {
            match currency {
                Currency::Usd => Ok(vec![
                    RateRow {
                        date: date(3),
                        rate: "90,0".to_string(),
                    },
                    RateRow {
                        date: date(4),
                        rate: "99,0".to_string(),
                    },
                ]),
                Currency::Eur => Ok(vec![RateRow {
                    date: date(3),
                    rate: "95,5".to_string(),
                }]),
                other => Err(anyhow!("no archive page for {other}")),
            }
        }
    }

    fn code_row(country: &str, code: &str) -> CountryCurrency {
        CountryCurrency {
            country: country.to_string(),
            currency: format!("{code} currency"),
            code: code.to_string(),
            number: "000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sync_codes_reports_upsert_counts() {
        let store = RateStore::in_memory();
        let provider = StubCodes(vec![code_row("США", "USD"), code_row("Япония", "JPY")]);

        let first = sync_country_codes(&provider, &store).await.unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(store.codes().len(), 2);

        let second = sync_country_codes(&provider, &store).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.unchanged, 2);
    }

    #[tokio::test]
    async fn test_sync_rates_skips_failing_currencies() {
        let store = RateStore::in_memory();
        let outcome = sync_rates(&StubArchive, &store, range()).await.unwrap();

        assert_eq!(outcome.snapshots.len(), 2);
        assert_eq!(outcome.skipped.len(), 5);
        assert!(!outcome.skipped.contains(&Currency::Usd));

        let snapshot = store.snapshots().get(&date(3)).unwrap();
        assert_eq!(snapshot.rate(Currency::Usd), Some("90,0"));
        assert_eq!(snapshot.rate(Currency::Eur), Some("95,5"));
        assert_eq!(snapshot.rate(Currency::Jpy), None);
    }

    #[tokio::test]
    async fn test_sync_rates_uses_earliest_date_as_baseline() {
        let store = RateStore::in_memory();
        let outcome = sync_rates(&StubArchive, &store, range()).await.unwrap();

        // Baseline 2024-06-03: USD on the 4th moved 90 -> 99.
        let usd = store.changes().get(&(date(4), Currency::Usd)).unwrap();
        assert!((usd.relative_change - 10.0).abs() < 1e-9);
        let usd_base = store.changes().get(&(date(3), Currency::Usd)).unwrap();
        assert!(usd_base.relative_change.abs() < 1e-9);
        assert!(outcome.changes.written() >= 3);
    }

    #[tokio::test]
    async fn test_sync_rates_merges_partial_snapshots() {
        let store = RateStore::in_memory();
        let mut existing = RateSnapshot::new(date(3));
        existing.set_rate(Currency::Jpy, "0,62".to_string());
        store.snapshots().upsert(date(3), existing);

        sync_rates(&StubArchive, &store, range()).await.unwrap();

        let merged = store.snapshots().get(&date(3)).unwrap();
        assert_eq!(merged.rate(Currency::Jpy), Some("0,62"));
        assert_eq!(merged.rate(Currency::Usd), Some("90,0"));
    }

    #[tokio::test]
    async fn test_change_series_flags_unknown_countries() {
        let store = RateStore::in_memory();
        store
            .codes()
            .upsert("США".to_string(), code_row("США", "USD"));
        store
            .codes()
            .upsert("Австралия".to_string(), code_row("Австралия", "AUD"));
        sync_rates(&StubArchive, &store, range()).await.unwrap();

        let countries = vec![
            "США".to_string(),
            "Австралия".to_string(),
            "Нарния".to_string(),
        ];
        let (series, missing) = change_series(&store, &countries, range());

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "США");
        assert_eq!(series[0].points.len(), 2);
        assert!(series[0].points[0].date < series[0].points[1].date);
        assert_eq!(missing, vec!["Австралия", "Нарния"]);
    }
}
