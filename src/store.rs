// src/store.rs
//! Observable console state.
//!
//! A single owner writes; any number of observers subscribe and see every
//! change. The collection is only ever replaced by a confirmed query result
//! or patched with a record the service returned, and the derived stats are
//! recomputed on each of those writes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::{Equipment, EquipmentId};
use crate::projection::SortState;
use crate::query_builders::{FilterCriteria, SearchInterpretation};
use crate::stats::{compute_stats_with, Clock, DerivedStats, StatsPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    pub collection: Vec<Equipment>,
    pub loading: LoadingState,
    pub error: Option<String>,
    pub filters: FilterCriteria,
    pub search_term: String,
    pub interpretation: Option<SearchInterpretation>,
    pub stats: DerivedStats,
    pub sort: SortState,
    pub history: Vec<String>,
    /// Sequence number of the query whose result is on screen
    pub applied_seq: u64,
}

impl ConsoleState {
    /// Collection in table order
    pub fn rows(&self) -> Vec<Equipment> {
        self.sort.apply(&self.collection)
    }

    pub fn find(&self, id: EquipmentId) -> Option<&Equipment> {
        self.collection.iter().find(|e| e.id == id)
    }
}

#[derive(Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<ConsoleState>>,
    policy: StatsPolicy,
    clock: Clock,
}

impl StateStore {
    pub fn new(policy: StatsPolicy, clock: Clock) -> Self {
        let (tx, _rx) = watch::channel(ConsoleState::default());
        Self { tx: Arc::new(tx), policy, clock }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsoleState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ConsoleState {
        self.tx.borrow().clone()
    }

    pub fn update<F: FnOnce(&mut ConsoleState)>(&self, f: F) {
        self.tx.send_modify(f);
    }

    pub fn stats(&self) -> DerivedStats {
        self.tx.borrow().stats
    }

    /// Recomputes stats against the current day, for a day rollover
    pub fn recompute_stats(&self) {
        let today = (self.clock)();
        let policy = self.policy;
        self.tx.send_modify(|state| {
            state.stats = compute_stats_with(&state.collection, today, &policy);
        });
    }

    /// Replaces the collection with a confirmed result and clears any error
    pub fn apply_result(&self, seq: u64, collection: Vec<Equipment>) {
        let today = (self.clock)();
        let policy = self.policy;
        self.tx.send_modify(|state| {
            state.stats = compute_stats_with(&collection, today, &policy);
            state.collection = collection;
            state.loading = LoadingState::Idle;
            state.error = None;
            state.applied_seq = seq;
        });
    }

    /// A failed query leaves an empty collection and the failure message
    pub fn apply_failure(&self, seq: u64, message: &str) {
        self.tx.send_modify(|state| {
            state.collection.clear();
            state.stats = DerivedStats::default();
            state.loading = LoadingState::Error;
            state.error = Some(message.to_string());
            state.applied_seq = seq;
        });
    }

    /// Replaces the record with the same id. Returns false when it is no
    /// longer in the collection.
    pub fn patch_record(&self, record: Equipment) -> bool {
        let today = (self.clock)();
        let policy = self.policy;
        let mut patched = false;
        self.tx.send_modify(|state| {
            if let Some(slot) = state.collection.iter_mut().find(|e| e.id == record.id) {
                *slot = record;
                state.stats = compute_stats_with(&state.collection, today, &policy);
                patched = true;
            }
        });
        patched
    }

    pub fn prepend_record(&self, record: Equipment) {
        let today = (self.clock)();
        let policy = self.policy;
        self.tx.send_modify(|state| {
            state.collection.insert(0, record);
            state.stats = compute_stats_with(&state.collection, today, &policy);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builders::EquipmentStatus;
    use crate::stats::fixed_clock;
    use chrono::NaiveDate;

    fn store() -> StateStore {
        StateStore::new(StatsPolicy::default(), fixed_clock(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()))
    }

    fn sample() -> Vec<Equipment> {
        vec![
            Equipment::new(1, "Powerplate 01", EquipmentStatus::Active),
            Equipment::new(2, "Powerplate 02", EquipmentStatus::Maintenance),
        ]
    }

    #[test]
    fn test_apply_result_recomputes_stats() {
        let store = store();
        store.update(|s| s.loading = LoadingState::Loading);
        store.apply_result(3, sample());

        let state = store.snapshot();
        assert_eq!(state.loading, LoadingState::Idle);
        assert_eq!(state.applied_seq, 3);
        assert_eq!(state.stats.total, 2);
        assert_eq!(state.stats.maintenance, 1);
    }

    #[test]
    fn test_failure_clears_collection() {
        let store = store();
        store.apply_result(1, sample());
        store.apply_failure(2, "network error");

        let state = store.snapshot();
        assert!(state.collection.is_empty());
        assert_eq!(state.stats, DerivedStats::default());
        assert_eq!(state.error.as_deref(), Some("network error"));
        assert_eq!(state.loading, LoadingState::Error);
    }

    #[test]
    fn test_patch_touches_only_matching_record() {
        let store = store();
        store.apply_result(1, sample());

        let patched = Equipment::new(1, "Powerplate 01", EquipmentStatus::Maintenance);
        assert!(store.patch_record(patched.clone()));
        let state = store.snapshot();
        assert_eq!(state.collection[0], patched);
        assert_eq!(state.collection[1], sample()[1]);
        assert_eq!(state.stats.maintenance, 2);

        assert!(!store.patch_record(Equipment::new(9, "Ghost", EquipmentStatus::Active)));
    }

    #[tokio::test]
    async fn test_observers_see_changes() {
        let store = store();
        let mut rx = store.subscribe();
        store.prepend_record(Equipment::new(5, "Bike", EquipmentStatus::Active));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().collection.len(), 1);
        assert_eq!(rx.borrow().stats.active, 1);
    }
}
