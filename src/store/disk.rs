//! Disk table backend: one fjall partition per table, JSON values.

use super::{Table, TableKey, UpsertOutcome};
use fjall::PartitionHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::warn;

pub struct DiskTable<K, V> {
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskTable<K, V> {
    pub fn new(partition: PartitionHandle) -> Self {
        Self {
            partition,
            _marker: PhantomData,
        }
    }
}

impl<K, V> Table<K, V> for DiskTable<K, V>
where
    K: TableKey + 'static,
    V: Serialize + DeserializeOwned + PartialEq + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let raw = match self.partition.get(key.encode()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "partition read failed");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, key = %key.encode(), "stored value failed to decode");
                None
            }
        }
    }

    fn upsert(&self, key: K, value: V) -> UpsertOutcome {
        let outcome = match self.get(&key) {
            Some(existing) if existing == value => return UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Inserted,
        };

        let encoded = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "value failed to encode, dropping write");
                return UpsertOutcome::Unchanged;
            }
        };
        match self.partition.insert(key.encode(), encoded) {
            Ok(()) => outcome,
            Err(e) => {
                warn!(error = %e, "partition write failed, dropping write");
                UpsertOutcome::Unchanged
            }
        }
    }

    fn scan(&self) -> Vec<(K, V)> {
        let mut rows = Vec::new();
        for kv in self.partition.iter() {
            let (key_raw, value_raw) = match kv {
                Ok(kv) => kv,
                Err(e) => {
                    warn!(error = %e, "partition scan failed mid-iteration");
                    break;
                }
            };
            let Ok(key_str) = std::str::from_utf8(&key_raw) else {
                warn!("skipping non-utf8 key during scan");
                continue;
            };
            let Some(key) = K::decode(key_str) else {
                warn!(key = key_str, "skipping undecodable key during scan");
                continue;
            };
            match serde_json::from_slice(&value_raw) {
                Ok(value) => rows.push((key, value)),
                Err(e) => warn!(error = %e, key = key_str, "skipping undecodable value during scan"),
            }
        }
        rows
    }

    fn len(&self) -> usize {
        self.partition.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::TempDir;

    fn table(dir: &TempDir) -> DiskTable<String, i32> {
        let keyspace = fjall::Config::new(dir.path()).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskTable::new(partition)
    }

    #[test]
    fn test_upsert_outcomes() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);

        assert_eq!(table.upsert("a".to_string(), 1), UpsertOutcome::Inserted);
        assert_eq!(table.upsert("a".to_string(), 1), UpsertOutcome::Unchanged);
        assert_eq!(table.upsert("a".to_string(), 2), UpsertOutcome::Updated);
        assert_eq!(table.get(&"a".to_string()), Some(2));
    }

    #[test]
    fn test_scan_is_key_ordered() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);
        table.upsert("b".to_string(), 2);
        table.upsert("a".to_string(), 1);
        table.upsert("c".to_string(), 3);

        assert_eq!(table.len(), 3);
        let keys: Vec<String> = table.scan().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
