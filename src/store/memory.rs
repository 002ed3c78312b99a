//! In-memory table backend over a `BTreeMap`.

use super::{Table, UpsertOutcome};
use std::collections::BTreeMap;
use std::sync::RwLock;

pub struct MemoryTable<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
}

impl<K: Ord, V> MemoryTable<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord, V> Default for MemoryTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Table<K, V> for MemoryTable<K, V>
where
    K: Ord + Clone + Send + Sync,
    V: Clone + PartialEq + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.read().unwrap().get(key).cloned()
    }

    fn upsert(&self, key: K, value: V) -> UpsertOutcome {
        let mut map = self.inner.write().unwrap();
        match map.get(&key) {
            Some(existing) if *existing == value => UpsertOutcome::Unchanged,
            Some(_) => {
                map.insert(key, value);
                UpsertOutcome::Updated
            }
            None => {
                map.insert(key, value);
                UpsertOutcome::Inserted
            }
        }
    }

    fn scan(&self) -> Vec<(K, V)> {
        self.inner
            .read()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_outcomes() {
        let table = MemoryTable::<String, i32>::new();

        assert_eq!(table.upsert("a".to_string(), 1), UpsertOutcome::Inserted);
        assert_eq!(table.upsert("a".to_string(), 1), UpsertOutcome::Unchanged);
        assert_eq!(table.upsert("a".to_string(), 2), UpsertOutcome::Updated);
        assert_eq!(table.get(&"a".to_string()), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_scan_is_key_ordered() {
        let table = MemoryTable::<String, i32>::new();
        table.upsert("b".to_string(), 2);
        table.upsert("a".to_string(), 1);
        table.upsert("c".to_string(), 3);

        let keys: Vec<String> = table.scan().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_missing_key() {
        let table = MemoryTable::<String, i32>::new();
        assert_eq!(table.get(&"nope".to_string()), None);
        assert!(table.is_empty());
    }
}
