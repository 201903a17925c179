// src/orchestrator.rs
//! Query orchestration for the equipment list.
//!
//! Filter and search-term changes are debounced: each change restarts the
//! timer, and only the last change within the window issues a query.
//! Every scheduled or issued query takes a sequence number; a result is
//! applied only if its number is still the latest when it arrives, so a slow
//! response can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SearchConfig;
use crate::error::ConsoleResult;
use crate::gateway::TransitionGateway;
use crate::history::SearchHistory;
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentId, UpdateEquipmentRequest};
use crate::notification::{Notification, Notifier};
use crate::projection::{SortField, SortState};
use crate::query_builders::{FilterCriteria, SearchInterpretation, SearchParams, StatusShortcutMode};
use crate::services::EquipmentService;
use crate::stats::DerivedStats;
use crate::store::{ConsoleState, LoadingState, StateStore};
use crate::validator::validate_request;

pub const REFRESH_SUCCESS_MESSAGE: &str = "Equipment list refreshed";
pub const CREATE_SUCCESS_MESSAGE: &str = "Equipment created";
pub const UPDATE_SUCCESS_MESSAGE: &str = "Equipment updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub debounce: Duration,
    pub shortcut_mode: StatusShortcutMode,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for QuerySettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            shortcut_mode: config.shortcut_mode,
        }
    }
}

struct Inner {
    service: Arc<dyn EquipmentService>,
    notifier: Arc<dyn Notifier>,
    store: StateStore,
    settings: QuerySettings,
    latest_seq: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    history: tokio::sync::Mutex<SearchHistory>,
}

impl Inner {
    fn next_seq(&self) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq.load(Ordering::SeqCst) == seq
    }

    /// Cancels a debounce timer that has not fired yet
    fn replace_pending(&self, handle: Option<JoinHandle<()>>) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
            *pending = handle;
        }
    }

    fn current_params(&self) -> SearchParams {
        let state = self.store.snapshot();
        SearchParams::build(&state.filters, state.interpretation.as_ref(), self.settings.shortcut_mode)
    }

    /// Returns Ok(false) when the result was discarded as stale
    async fn run_query(&self, seq: u64) -> ConsoleResult<bool> {
        let params = self.current_params();
        self.store.update(|state| state.loading = LoadingState::Loading);
        log::debug!("Query #{}: {:?}", seq, params);

        let result = self.service.search(&params).await;
        if !self.is_latest(seq) {
            log::debug!("Discarding stale result of query #{}", seq);
            return Ok(false);
        }

        match result {
            Ok(collection) => {
                log::debug!("Query #{} returned {} records", seq, collection.len());
                self.store.apply_result(seq, collection);
                Ok(true)
            }
            Err(e) => {
                log::error!("Query #{} failed: {}", seq, e);
                self.store.apply_failure(seq, e.user_message());
                self.notifier.show(Notification::error(e.user_message()));
                Err(e)
            }
        }
    }
}

#[derive(Clone)]
pub struct QueryOrchestrator {
    inner: Arc<Inner>,
}

impl QueryOrchestrator {
    pub fn new(
        service: Arc<dyn EquipmentService>,
        notifier: Arc<dyn Notifier>,
        store: StateStore,
        history: SearchHistory,
        settings: QuerySettings,
    ) -> Self {
        let entries = history.entries().to_vec();
        store.update(|state| state.history = entries);

        Self {
            inner: Arc::new(Inner {
                service,
                notifier,
                store,
                settings,
                latest_seq: AtomicU64::new(0),
                pending: Mutex::new(None),
                history: tokio::sync::Mutex::new(history),
            }),
        }
    }

    // ==================== OBSERVATION ====================

    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsoleState> {
        self.inner.store.subscribe()
    }

    pub fn snapshot(&self) -> ConsoleState {
        self.inner.store.snapshot()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.snapshot().loading
    }

    pub fn collection(&self) -> Vec<Equipment> {
        self.snapshot().collection
    }

    pub fn stats(&self) -> DerivedStats {
        self.inner.store.stats()
    }

    /// Collection in the current table order
    pub fn rows(&self) -> Vec<Equipment> {
        self.snapshot().rows()
    }

    pub fn history(&self) -> Vec<String> {
        self.snapshot().history
    }

    /// Hint for the search box, absent for a blank term
    pub fn search_hint(&self) -> Option<String> {
        self.snapshot()
            .interpretation
            .map(|i| i.hint(self.inner.settings.shortcut_mode))
    }

    pub fn current_params(&self) -> SearchParams {
        self.inner.current_params()
    }

    pub fn gateway(&self) -> TransitionGateway {
        TransitionGateway::new(
            Arc::clone(&self.inner.service),
            Arc::clone(&self.inner.notifier),
            self.inner.store.clone(),
        )
    }

    // ==================== SORTING ====================

    pub fn toggle_sort(&self, field: SortField) {
        self.inner.store.update(|state| state.sort = state.sort.toggle(field));
    }

    pub fn set_sort(&self, sort: SortState) {
        self.inner.store.update(|state| state.sort = sort);
    }

    // ==================== QUERYING ====================

    /// Replaces the filter criteria and schedules a debounced query.
    /// Must be called from within a tokio runtime.
    pub fn set_filters(&self, criteria: FilterCriteria) {
        self.inner.store.update(|state| state.filters = criteria);
        self.schedule_query();
    }

    pub fn clear_filters(&self) {
        self.set_filters(FilterCriteria::none());
    }

    /// Replaces the search term, resolves its interpretation and schedules a
    /// debounced query. Must be called from within a tokio runtime.
    pub fn set_search_term(&self, term: &str) {
        let interpretation = SearchInterpretation::resolve(term);
        let term = term.to_string();
        self.inner.store.update(|state| {
            state.search_term = term;
            state.interpretation = interpretation;
        });
        self.schedule_query();
    }

    fn schedule_query(&self) {
        let seq = self.inner.next_seq();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.settings.debounce).await;
            if !inner.is_latest(seq) {
                return;
            }
            // detached so that cancelling a later timer cannot cancel this request
            tokio::spawn(async move {
                let _ = inner.run_query(seq).await;
            });
        });
        self.inner.replace_pending(Some(handle));
    }

    /// Issues a query for the current input right away, skipping the debounce.
    /// Returns Ok(false) when a newer query superseded it.
    pub async fn flush(&self) -> ConsoleResult<bool> {
        let seq = self.inner.next_seq();
        self.inner.replace_pending(None);
        self.inner.run_query(seq).await
    }

    /// Clears filters and search term, then queries immediately
    pub async fn refresh(&self) -> ConsoleResult<()> {
        let seq = self.inner.next_seq();
        self.inner.replace_pending(None);
        self.inner.store.update(|state| {
            state.filters = FilterCriteria::none();
            state.search_term.clear();
            state.interpretation = None;
        });

        if self.inner.run_query(seq).await? {
            self.inner.notifier.show(Notification::success(REFRESH_SUCCESS_MESSAGE));
        }
        Ok(())
    }

    // ==================== SEARCH HISTORY ====================

    /// Commits the current term to the history (explicit submit)
    pub async fn commit_search(&self) -> bool {
        let term = self.snapshot().search_term;
        self.record_history(&term).await
    }

    /// Re-applies a remembered term and moves it to the front
    pub async fn select_history(&self, term: &str) -> bool {
        self.set_search_term(term);
        self.record_history(term).await
    }

    async fn record_history(&self, term: &str) -> bool {
        let mut history = self.inner.history.lock().await;
        let recorded = history.record_term(term).await;
        if recorded {
            let entries = history.entries().to_vec();
            self.inner.store.update(|state| state.history = entries);
        }
        recorded
    }

    // ==================== CREATE / EDIT ====================

    /// Validation failures are returned without notifying
    pub async fn create_equipment(&self, request: CreateEquipmentRequest) -> ConsoleResult<Equipment> {
        validate_request(&request)?;

        match self.inner.service.create(&request).await {
            Ok(created) => {
                log::info!("Created equipment {} '{}'", created.id, created.name);
                self.inner.store.prepend_record(created.clone());
                self.inner.notifier.show(Notification::success(CREATE_SUCCESS_MESSAGE));
                Ok(created)
            }
            Err(e) => {
                self.inner.notifier.show(Notification::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn update_equipment(
        &self,
        id: EquipmentId,
        request: UpdateEquipmentRequest,
    ) -> ConsoleResult<Equipment> {
        validate_request(&request)?;

        match self.inner.service.update(id, &request).await {
            Ok(updated) => {
                if !self.inner.store.patch_record(updated.clone()) {
                    log::debug!("Edited equipment {} is not in the current collection", id);
                }
                self.inner.notifier.show(Notification::success(UPDATE_SUCCESS_MESSAGE));
                Ok(updated)
            }
            Err(e) => {
                self.inner.notifier.show(Notification::error(e.user_message()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::history::{HistorySettings, SEARCH_HISTORY_KEY};
    use crate::notification::{NotificationKind, NotificationSlot};
    use crate::projection::SortDirection;
    use crate::query_builders::{DateRange, EquipmentStatus};
    use crate::services::scripted::ScriptedService;
    use crate::stats::{fixed_clock, StatsPolicy};
    use crate::storage::{KeyValueStore, MemoryStore};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn records() -> Vec<Equipment> {
        vec![
            Equipment::new(1, "Fast bike", EquipmentStatus::Active)
                .with_next_maintenance(NaiveDate::from_ymd_opt(2024, 6, 12)),
            Equipment::new(2, "Slow rower", EquipmentStatus::Maintenance),
            Equipment::new(3, "Powerplate 03", EquipmentStatus::Active),
        ]
    }

    struct Harness {
        orchestrator: QueryOrchestrator,
        service: Arc<ScriptedService>,
        slot: NotificationSlot,
        history_store: Arc<MemoryStore>,
    }

    fn harness() -> Harness {
        let service = Arc::new(ScriptedService::new(records(), fixed_clock(today())));
        let slot = NotificationSlot::new();
        let history_store = Arc::new(MemoryStore::new());
        let history = SearchHistory::empty(history_store.clone(), HistorySettings::default());
        let orchestrator = QueryOrchestrator::new(
            service.clone(),
            Arc::new(slot.clone()),
            StateStore::new(StatsPolicy::default(), fixed_clock(today())),
            history,
            QuerySettings::default(),
        );
        Harness { orchestrator, service, slot, history_store }
    }

    fn names(collection: &[Equipment]) -> Vec<&str> {
        collection.iter().map(|e| e.name.as_str()).collect()
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_issues_one_query() {
        let h = harness();
        h.orchestrator.set_search_term("p");
        sleep_ms(100).await;
        h.orchestrator.set_search_term("po");
        sleep_ms(100).await;
        h.orchestrator.set_search_term("pow");

        sleep_ms(350).await;
        assert!(h.service.searches().is_empty());

        sleep_ms(100).await;
        let searches = h.service.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].name.as_deref(), Some("pow"));
        assert_eq!(names(&h.orchestrator.collection()), vec!["Powerplate 03"]);
        assert_eq!(h.orchestrator.loading_state(), LoadingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_never_overwrites_newer_one() {
        let h = harness();
        h.service.delay_search("slow", Duration::from_millis(1000));

        h.orchestrator.set_search_term("slow");
        sleep_ms(450).await;
        assert_eq!(h.orchestrator.loading_state(), LoadingState::Loading);

        h.orchestrator.set_search_term("fast");
        sleep_ms(600).await;
        assert_eq!(names(&h.orchestrator.collection()), vec!["Fast bike"]);

        // the "slow" request resolves now and must be dropped
        sleep_ms(1000).await;
        let state = h.orchestrator.snapshot();
        assert_eq!(h.service.searches().len(), 2);
        assert_eq!(names(&state.collection), vec!["Fast bike"]);
        assert_eq!(state.applied_seq, 2);
        assert_eq!(state.loading, LoadingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filters_translate_to_params() {
        let h = harness();
        let criteria = FilterCriteria::none()
            .with_status(EquipmentStatus::Active)
            .with_next_maintenance(DateRange::until(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        h.orchestrator.set_filters(criteria);
        sleep_ms(500).await;

        let searches = h.service.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].estado, Some(EquipmentStatus::Active));
        assert_eq!(names(&h.orchestrator.collection()), vec!["Fast bike"]);
        assert_eq!(h.orchestrator.stats().upcoming, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_shortcut_narrows_query() {
        let h = harness();
        h.orchestrator.set_search_term("Mantenimiento");
        assert_eq!(
            h.orchestrator.search_hint().as_deref(),
            Some("Showing equipment with status Maintenance")
        );
        sleep_ms(500).await;

        let searches = h.service.searches();
        assert_eq!(searches[0].name, None);
        assert_eq!(searches[0].estado, Some(EquipmentStatus::Maintenance));
        assert_eq!(names(&h.orchestrator.collection()), vec!["Slow rower"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_clears_input_and_notifies() {
        let h = harness();
        h.orchestrator.set_filters(FilterCriteria::none().with_status(EquipmentStatus::Maintenance));
        h.orchestrator.set_search_term("rower");

        h.orchestrator.refresh().await.unwrap();
        let state = h.orchestrator.snapshot();
        assert!(state.filters.is_empty());
        assert!(state.search_term.is_empty());
        assert_eq!(state.collection.len(), 3);
        assert_eq!(h.slot.current(), Some(Notification::success(REFRESH_SUCCESS_MESSAGE)));

        // the cancelled debounce timer never fires
        sleep_ms(1000).await;
        assert_eq!(h.service.searches().len(), 1);
        assert!(h.service.searches()[0].is_unfiltered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_query_clears_collection() {
        let h = harness();
        h.orchestrator.refresh().await.unwrap();
        assert_eq!(h.orchestrator.collection().len(), 3);

        h.service.fail_with(Some("network error"));
        let err = h.orchestrator.refresh().await.unwrap_err();
        assert_eq!(err.user_message(), "network error");

        let state = h.orchestrator.snapshot();
        assert!(state.collection.is_empty());
        assert_eq!(state.stats, DerivedStats::default());
        assert_eq!(state.loading, LoadingState::Error);
        assert_eq!(state.error.as_deref(), Some("network error"));
        assert_eq!(h.slot.current(), Some(Notification::error("network error")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_commit_and_select() {
        let h = harness();
        h.orchestrator.set_search_term("  bike ");
        assert!(h.orchestrator.commit_search().await);
        h.orchestrator.set_search_term("ab");
        assert!(!h.orchestrator.commit_search().await);
        assert!(h.orchestrator.select_history("rower").await);
        assert!(h.orchestrator.select_history("bike").await);

        assert_eq!(h.orchestrator.history(), vec!["bike".to_string(), "rower".to_string()]);
        assert_eq!(
            h.history_store.get(SEARCH_HISTORY_KEY).await.unwrap().as_deref(),
            Some("[\"bike\",\"rower\"]")
        );

        sleep_ms(500).await;
        let searches = h.service.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].name.as_deref(), Some("bike"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_prepends_and_notifies() {
        let h = harness();
        h.orchestrator.refresh().await.unwrap();

        let created = h
            .orchestrator
            .create_equipment(CreateEquipmentRequest::new("Treadmill"))
            .await
            .unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(h.orchestrator.collection()[0], created);
        assert_eq!(h.orchestrator.stats().total, 4);
        assert_eq!(h.slot.current(), Some(Notification::success(CREATE_SUCCESS_MESSAGE)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_validation_is_inline() {
        let h = harness();
        let err = h
            .orchestrator
            .create_equipment(CreateEquipmentRequest::new("   "))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(h.service.calls(), 0);
        assert_eq!(h.slot.shown_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_rejection_is_notified_verbatim() {
        let h = harness();
        h.orchestrator.refresh().await.unwrap();

        let err = h
            .orchestrator
            .create_equipment(CreateEquipmentRequest::new("Slow rower"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Service(_)));
        assert_eq!(h.orchestrator.collection().len(), 3);
        let shown = h.slot.current().unwrap();
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, err.user_message());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_replaces_in_place() {
        let h = harness();
        h.orchestrator.refresh().await.unwrap();

        let mut request = UpdateEquipmentRequest::from(&records()[1]);
        request.technical_spec = Some("belt drive".to_string());
        h.orchestrator.update_equipment(2, request).await.unwrap();

        let collection = h.orchestrator.collection();
        assert_eq!(collection[1].technical_spec.as_deref(), Some("belt drive"));
        assert_eq!(names(&collection), vec!["Fast bike", "Slow rower", "Powerplate 03"]);
        assert_eq!(h.slot.current(), Some(Notification::success(UPDATE_SUCCESS_MESSAGE)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_and_gateway_share_state() {
        let h = harness();
        h.orchestrator.refresh().await.unwrap();

        h.orchestrator.toggle_sort(SortField::Name);
        assert_eq!(names(&h.orchestrator.rows()), vec!["Fast bike", "Powerplate 03", "Slow rower"]);
        h.orchestrator.toggle_sort(SortField::Name);
        assert_eq!(h.orchestrator.snapshot().sort.direction, SortDirection::Desc);

        h.orchestrator.gateway().toggle(2).await.unwrap();
        assert_eq!(h.orchestrator.stats().maintenance, 0);
        assert_eq!(h.orchestrator.collection()[1].status, EquipmentStatus::Active);
    }
}
