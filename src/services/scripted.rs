// src/services/scripted.rs
//! Test double: the local service with scripted latency and failures

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentId, UpdateEquipmentRequest};
use crate::query_builders::SearchParams;
use crate::stats::Clock;

use super::{EquipmentService, LocalEquipmentService};

pub struct ScriptedService {
    inner: LocalEquipmentService,
    /// Search latency keyed by the name parameter
    delays: Mutex<HashMap<String, Duration>>,
    failure: Mutex<Option<String>>,
    searches: Mutex<Vec<SearchParams>>,
    calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new(records: Vec<Equipment>, clock: Clock) -> Self {
        Self {
            inner: LocalEquipmentService::with_records(records).with_clock(clock),
            delays: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            searches: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delay_search(&self, name: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(name.to_string(), delay);
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn searches(&self) -> Vec<SearchParams> {
        self.searches.lock().unwrap().clone()
    }

    /// Every call, searches included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> ConsoleResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(ConsoleError::service(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EquipmentService for ScriptedService {
    async fn search(&self, params: &SearchParams) -> ConsoleResult<Vec<Equipment>> {
        self.searches.lock().unwrap().push(params.clone());
        let delay = params
            .name
            .as_ref()
            .and_then(|name| self.delays.lock().unwrap().get(name).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        self.inner.search(params).await
    }

    async fn create(&self, data: &CreateEquipmentRequest) -> ConsoleResult<Equipment> {
        self.check()?;
        self.inner.create(data).await
    }

    async fn update(&self, id: EquipmentId, data: &UpdateEquipmentRequest) -> ConsoleResult<Equipment> {
        self.check()?;
        self.inner.update(id, data).await
    }

    async fn to_maintenance(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.check()?;
        self.inner.to_maintenance(id).await
    }

    async fn activate(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.check()?;
        self.inner.activate(id).await
    }
}
