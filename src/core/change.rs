//! Relative-change computation against a baseline date.

use crate::core::currency::Currency;
use crate::core::model::RateChange;
use crate::store::{RateStore, UpsertOutcome};
use chrono::NaiveDate;
use tracing::debug;

/// What a recomputation pass did, per (date, currency) pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl ChangeSummary {
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }
}

/// The archive prints rates with a decimal comma.
pub fn normalize_rate(raw: &str) -> String {
    raw.trim().replace(',', ".")
}

pub fn parse_rate(raw: &str) -> Option<f64> {
    normalize_rate(raw).parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn relative_change(baseline: f64, rate: f64) -> f64 {
    (rate - baseline) / baseline * 100.0
}

/// Recomputes stored rate changes for every snapshot against the
/// snapshot at `baseline`.
///
/// No snapshot at the baseline date means there is nothing to compare
/// against: the pass is a no-op, not an error. A pair whose baseline
/// rate is absent, unparsable, or zero is skipped. Upserts are
/// idempotent: a value identical to the stored one is left untouched.
pub fn recompute_changes(store: &RateStore, baseline: NaiveDate) -> ChangeSummary {
    let mut summary = ChangeSummary::default();

    let Some(base) = store.snapshots().get(&baseline) else {
        debug!(%baseline, "no snapshot at baseline date, nothing to recompute");
        return summary;
    };

    for (date, snapshot) in store.snapshots().scan() {
        for currency in Currency::ALL {
            let Some(rate) = snapshot.rate(currency).and_then(parse_rate) else {
                summary.skipped += 1;
                continue;
            };
            let base_rate = base.rate(currency).and_then(parse_rate);
            let Some(base_rate) = base_rate.filter(|r| *r != 0.0) else {
                summary.skipped += 1;
                continue;
            };

            let change = RateChange {
                currency,
                date,
                relative_change: relative_change(base_rate, rate),
            };
            match store.changes().upsert((date, currency), change) {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
                UpsertOutcome::Unchanged => summary.unchanged += 1,
            }
        }
    }

    debug!(
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        %baseline,
        "rate changes recomputed"
    );
    summary
}
