// src/history.rs
//! Recent search terms, most recent first.
//!
//! Invariants: no duplicates, at most `capacity` entries, only terms longer
//! than the minimum trimmed length. Terms enter only on explicit commit.
//! A missing or corrupt persisted value degrades to an empty history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const SEARCH_HISTORY_KEY: &str = "equipo_search_history";
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;
/// Terms with a trimmed length at or below this are ignored
pub const DEFAULT_MIN_TERM_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    pub key: String,
    pub capacity: usize,
    pub min_term_chars: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            key: SEARCH_HISTORY_KEY.to_string(),
            capacity: DEFAULT_HISTORY_CAPACITY,
            min_term_chars: DEFAULT_MIN_TERM_CHARS,
        }
    }
}

impl HistorySettings {
    /// Trimmed term if it is long enough to be remembered
    pub fn accept<'a>(&self, term: &'a str) -> Option<&'a str> {
        let trimmed = term.trim();
        (trimmed.chars().count() > self.min_term_chars).then_some(trimmed)
    }
}

pub struct SearchHistory {
    entries: Vec<String>,
    store: Arc<dyn KeyValueStore>,
    settings: HistorySettings,
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("entries", &self.entries)
            .field("settings", &self.settings)
            .finish()
    }
}

impl SearchHistory {
    /// Empty history bound to a store, without reading it
    pub fn empty(store: Arc<dyn KeyValueStore>, settings: HistorySettings) -> Self {
        Self { entries: Vec::new(), store, settings }
    }

    /// Reads the persisted list once. Never fails.
    pub async fn load(store: Arc<dyn KeyValueStore>, settings: HistorySettings) -> Self {
        let raw = match store.get(&settings.key).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Failed to read search history '{}': {}", settings.key, e);
                None
            }
        };

        let entries = match raw {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(stored) => sanitize(stored, &settings),
                Err(e) => {
                    log::warn!("Discarding corrupt search history '{}': {}", settings.key, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        log::debug!("Loaded {} search history entries", entries.len());
        Self { entries, store, settings }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn settings(&self) -> &HistorySettings {
        &self.settings
    }

    /// Moves or inserts the term at the front and persists. Returns false
    /// when the term is too short to be remembered.
    pub async fn record_term(&mut self, term: &str) -> bool {
        let Some(term) = self.settings.accept(term) else {
            return false;
        };
        push_front(&mut self.entries, term, self.settings.capacity);
        self.persist().await;
        true
    }

    async fn persist(&self) {
        let serialized = match serde_json::to_string(&self.entries) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize search history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.settings.key, &serialized).await {
            log::warn!("Failed to persist search history '{}': {}", self.settings.key, e);
        }
    }
}

/// Move-to-front insertion with eviction past `capacity`
pub fn push_front(entries: &mut Vec<String>, term: &str, capacity: usize) {
    entries.retain(|existing| existing != term);
    entries.insert(0, term.to_string());
    entries.truncate(capacity);
}

/// Re-establishes the invariants on whatever the store handed back
fn sanitize(stored: Vec<String>, settings: &HistorySettings) -> Vec<String> {
    let mut entries: Vec<String> = Vec::with_capacity(settings.capacity);
    for term in stored {
        let Some(term) = settings.accept(&term) else {
            continue;
        };
        if entries.iter().any(|e| e == term) {
            continue;
        }
        entries.push(term.to_string());
        if entries.len() == settings.capacity {
            break;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsoleError, ConsoleResult};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> ConsoleResult<Option<String>> {
            Err(ConsoleError::Persistence("disk unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> ConsoleResult<()> {
            Err(ConsoleError::Persistence("disk unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_absent_is_empty() {
        let history = SearchHistory::load(Arc::new(MemoryStore::new()), HistorySettings::default()).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_is_empty() {
        let store = Arc::new(MemoryStore::with_value(SEARCH_HISTORY_KEY, "{not json"));
        let history = SearchHistory::load(store, HistorySettings::default()).await;
        assert!(history.is_empty());

        let store = Arc::new(MemoryStore::with_value(SEARCH_HISTORY_KEY, "{\"a\": 1}"));
        let history = SearchHistory::load(store, HistorySettings::default()).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_is_empty_and_record_survives() {
        let mut history = SearchHistory::load(Arc::new(BrokenStore), HistorySettings::default()).await;
        assert!(history.is_empty());
        assert!(history.record_term("powerplate").await);
        assert_eq!(history.entries(), &["powerplate".to_string()]);
    }

    #[tokio::test]
    async fn test_load_sanitizes_stored_list() {
        let raw = r#"["bike", "ab", "bike", "rower", "a", "c1", "c2", "c3", "c4"]"#;
        let store = Arc::new(MemoryStore::with_value(SEARCH_HISTORY_KEY, raw));
        let history = SearchHistory::load(store, HistorySettings::default()).await;
        assert_eq!(history.entries(), &["bike", "rower", "c1", "c2", "c3"].map(String::from));
    }

    #[tokio::test]
    async fn test_short_terms_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut history = SearchHistory::empty(store.clone(), HistorySettings::default());
        assert!(!history.record_term("ab").await);
        assert!(!history.record_term("  ab  ").await);
        assert!(history.is_empty());
        assert_eq!(store.get(SEARCH_HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_record_moves_to_front_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut history = SearchHistory::empty(store.clone(), HistorySettings::default());
        history.record_term("bike").await;
        history.record_term(" rower ").await;
        history.record_term("bike").await;

        assert_eq!(history.entries(), &["bike".to_string(), "rower".to_string()]);
        assert_eq!(
            store.get(SEARCH_HISTORY_KEY).await.unwrap().as_deref(),
            Some("[\"bike\",\"rower\"]")
        );

        let reloaded = SearchHistory::load(store, HistorySettings::default()).await;
        assert_eq!(reloaded.entries(), history.entries());
    }

    #[tokio::test]
    async fn test_capacity_and_uniqueness_hold_for_any_sequence() {
        let mut history = SearchHistory::empty(Arc::new(MemoryStore::new()), HistorySettings::default());
        let terms = ["alpha", "beta", "gamma", "xy", "alpha", "delta", "epsilon", "zeta", "beta", "eta"];
        for (i, term) in terms.iter().cycle().take(40).enumerate() {
            history.record_term(term).await;
            let entries = history.entries();
            assert!(entries.len() <= DEFAULT_HISTORY_CAPACITY, "step {}", i);
            let mut unique = entries.to_vec();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), entries.len(), "step {}", i);
        }
        assert_eq!(history.entries()[0], "eta");
    }

    #[test]
    fn test_push_front_evicts_oldest() {
        let mut entries: Vec<String> = ["e", "d", "c", "b", "a"].map(String::from).to_vec();
        push_front(&mut entries, "f", 5);
        assert_eq!(entries, ["f", "e", "d", "c", "b"].map(String::from).to_vec());
    }
}
