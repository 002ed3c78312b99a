//! Keyed tables with natural-key upsert.
//!
//! Every persisted collection is a map from a natural key to one value:
//! country codes by country, snapshots by date, changes by
//! (date, currency). `upsert` reports whether it actually wrote so that
//! re-running a sync is observable as a no-op.

pub mod disk;
pub mod memory;

use crate::core::currency::Currency;
use crate::core::model::{CountryCurrency, RateChange, RateSnapshot};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use disk::DiskTable;
use fjall::PartitionCreateOptions;
use memory::MemoryTable;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The stored value was already identical; nothing was rewritten.
    Unchanged,
}

pub trait Table<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    /// Writes `value` under `key` unless an identical value is already
    /// stored.
    fn upsert(&self, key: K, value: V) -> UpsertOutcome;

    /// All rows in key order.
    fn scan(&self) -> Vec<(K, V)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Natural keys encoded as order-preserving byte strings for the disk
/// backend. The in-memory backend sorts by `Ord`, so the two orders
/// must agree.
pub trait TableKey: Ord + Clone + Send + Sync {
    fn encode(&self) -> String;
    fn decode(raw: &str) -> Option<Self>;
}

impl TableKey for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl TableKey for NaiveDate {
    fn encode(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

impl TableKey for (NaiveDate, Currency) {
    fn encode(&self) -> String {
        format!("{}/{}", self.0.format("%Y-%m-%d"), self.1.code())
    }

    fn decode(raw: &str) -> Option<Self> {
        let (date, code) = raw.split_once('/')?;
        Some((
            NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
            Currency::from_code(code)?,
        ))
    }
}

pub type ChangeKey = (NaiveDate, Currency);

/// The three keyed tables the application persists.
pub struct RateStore {
    codes: Box<dyn Table<String, CountryCurrency>>,
    snapshots: Box<dyn Table<NaiveDate, RateSnapshot>>,
    changes: Box<dyn Table<ChangeKey, RateChange>>,
}

impl RateStore {
    pub fn in_memory() -> Self {
        Self {
            codes: Box::new(MemoryTable::new()),
            snapshots: Box::new(MemoryTable::new()),
            changes: Box::new(MemoryTable::new()),
        }
    }

    /// Opens (or creates) a disk-backed store under `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("failed to open keyspace at {}", path.display()))?;

        let partition = |name: &str| {
            keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .with_context(|| format!("failed to open partition `{name}`"))
        };

        Ok(Self {
            codes: Box::new(DiskTable::new(partition("country_codes")?)),
            snapshots: Box::new(DiskTable::new(partition("rate_snapshots")?)),
            changes: Box::new(DiskTable::new(partition("rate_changes")?)),
        })
    }

    pub fn codes(&self) -> &dyn Table<String, CountryCurrency> {
        self.codes.as_ref()
    }

    pub fn snapshots(&self) -> &dyn Table<NaiveDate, RateSnapshot> {
        self.snapshots.as_ref()
    }

    pub fn changes(&self) -> &dyn Table<ChangeKey, RateChange> {
        self.changes.as_ref()
    }
}
