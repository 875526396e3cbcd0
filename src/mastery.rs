//! Mastery Store
//!
//! Durable per-(level, item) proficiency. Records are created on first
//! mutation and never deleted. After every mutation the whole map is written
//! back under one key; storage failures are logged and swallowed, leaving the
//! in-memory map authoritative for the rest of the session.

use std::collections::BTreeMap;

use crate::store::KeyValueStore;
use crate::types::MasteryRecord;

pub struct MasteryStore<S> {
    records: BTreeMap<String, MasteryRecord>,
    store: S,
    storage_key: String,
}

impl<S: KeyValueStore> MasteryStore<S> {
    /// Loads the persisted map. A missing, unreadable or corrupt entry starts
    /// an empty map.
    pub fn load(store: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let records = match store.get(&storage_key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(error = %e, key = %storage_key, "Corrupt mastery data, starting empty");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = %storage_key, "Could not load mastery data");
                BTreeMap::new()
            }
        };

        tracing::debug!(records = records.len(), key = %storage_key, "Mastery data loaded");

        Self {
            records,
            store,
            storage_key,
        }
    }

    fn record_key(item: &str, level: &str) -> String {
        format!("{level}:{item}")
    }

    pub fn record(&self, item: &str, level: &str) -> Option<&MasteryRecord> {
        self.records.get(&Self::record_key(item, level))
    }

    /// `successes / attempts`, 0 for an unseen item.
    pub fn score(&self, item: &str, level: &str) -> f64 {
        self.record(item, level).map(MasteryRecord::score).unwrap_or(0.0)
    }

    /// Counts a correct answer and blends `elapsed_ms` into the average
    /// response time. The blend is a two-point mean with the previous average,
    /// so recent answers dominate.
    pub fn record_success(&mut self, item: &str, level: &str, elapsed_ms: i64, now_ms: i64) -> f64 {
        let elapsed = elapsed_ms as f64;
        let record = self.records.entry(Self::record_key(item, level)).or_default();
        record.attempts = record.attempts.saturating_add(1);
        record.successes = record.successes.saturating_add(1).min(record.attempts);
        record.last_seen = Some(now_ms);
        record.average_response_ms = Some(match record.average_response_ms {
            Some(previous) => (previous + elapsed) / 2.0,
            None => elapsed,
        });
        let score = record.score();

        self.persist();
        score
    }

    /// Counts a wrong answer: attempts only.
    pub fn record_attempt_failure(&mut self, item: &str, level: &str, now_ms: i64) -> f64 {
        let record = self.records.entry(Self::record_key(item, level)).or_default();
        record.attempts = record.attempts.saturating_add(1);
        record.last_seen = Some(now_ms);
        let score = record.score();

        self.persist();
        score
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(level:item, record)` pairs in key order
    pub fn records(&self) -> impl Iterator<Item = (&str, &MasteryRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.records) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Could not serialize mastery data");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.storage_key, &serialized) {
            tracing::warn!(error = %e, key = %self.storage_key, "Could not save mastery data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::store::MemoryStore;

    const KEY: &str = "geogenie_mastery";

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_unseen_item_scores_zero() {
        let store = MasteryStore::load(MemoryStore::new(), KEY);
        assert_eq!(store.score("Mars", "solar-system"), 0.0);
        assert!(store.record("Mars", "solar-system").is_none());
    }

    #[test]
    fn test_success_and_failure_counting() {
        let mut store = MasteryStore::load(MemoryStore::new(), KEY);
        store.record_attempt_failure("Mars", "solar-system", 1_000);
        store.record_success("Mars", "solar-system", 2_000, 3_000);

        let record = store.record("Mars", "solar-system").unwrap();
        assert_eq!(record.attempts, 2);
        assert_eq!(record.successes, 1);
        assert_eq!(record.last_seen, Some(3_000));
        assert!((store.score("Mars", "solar-system") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_average_response_is_two_point_blend() {
        let mut store = MasteryStore::load(MemoryStore::new(), KEY);
        store.record_success("Earth", "solar-system", 4_000, 0);
        assert_eq!(store.record("Earth", "solar-system").unwrap().average_response_ms, Some(4_000.0));

        store.record_success("Earth", "solar-system", 2_000, 0);
        assert_eq!(store.record("Earth", "solar-system").unwrap().average_response_ms, Some(3_000.0));

        // A true running mean would be 2_666; the blend gives 2_500
        store.record_success("Earth", "solar-system", 2_000, 0);
        assert_eq!(store.record("Earth", "solar-system").unwrap().average_response_ms, Some(2_500.0));
    }

    #[test]
    fn test_backwards_clock_blends_raw_elapsed() {
        let mut store = MasteryStore::load(MemoryStore::new(), KEY);
        store.record_success("Venus", "solar-system", 1_000, 0);
        store.record_success("Venus", "solar-system", -3_000, 0);
        assert_eq!(store.record("Venus", "solar-system").unwrap().average_response_ms, Some(-1_000.0));
        assert_eq!(store.score("Venus", "solar-system"), 1.0);
    }

    #[test]
    fn test_levels_are_separate() {
        let mut store = MasteryStore::load(MemoryStore::new(), KEY);
        store.record_success("Georgia", "us-states", 1_000, 0);
        assert_eq!(store.score("Georgia", "us-states"), 1.0);
        assert_eq!(store.score("Georgia", "world-map"), 0.0);
    }

    #[test]
    fn test_persists_after_every_mutation() {
        let backing = MemoryStore::new();
        let mut store = MasteryStore::load(backing.clone(), KEY);
        store.record_attempt_failure("Mars", "solar-system", 10);

        let raw = backing.get(KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["solar-system:Mars"]["attempts"], 1);
        assert_eq!(value["solar-system:Mars"]["successes"], 0);

        let reloaded = MasteryStore::load(backing, KEY);
        assert_eq!(reloaded.record("Mars", "solar-system").unwrap().attempts, 1);
    }

    #[test]
    fn test_corrupt_entry_loads_empty() {
        let backing = MemoryStore::with_entry(KEY, "{not json");
        let store = MasteryStore::load(backing, KEY);
        assert!(store.is_empty());
        assert_eq!(store.score("Mars", "solar-system"), 0.0);
    }

    #[test]
    fn test_broken_store_keeps_in_memory_state() {
        let mut store = MasteryStore::load(BrokenStore, KEY);
        assert!(store.is_empty());
        store.record_success("Mars", "solar-system", 500, 0);
        store.record_attempt_failure("Mars", "solar-system", 0);
        assert!((store.score("Mars", "solar-system") - 0.5).abs() < 1e-12);
    }
}
