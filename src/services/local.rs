// src/services/local.rs
//! In-process equipment service.
//!
//! Mirrors the remote service's rules so the console can run offline and be
//! tested without a network: unique names, next maintenance derived as last
//! maintenance plus three months, idempotent lifecycle endpoints.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};

use crate::error::{ConsoleError, ConsoleResult};
use crate::lifecycle::LifecycleOperation;
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentId, UpdateEquipmentRequest};
use crate::query_builders::{EquipmentStatus, SearchParams};
use crate::stats::{system_clock, Clock};

use super::EquipmentService;

/// Months between two scheduled maintenances
pub const MAINTENANCE_INTERVAL_MONTHS: u32 = 3;

pub fn next_maintenance_after(last: NaiveDate) -> Option<NaiveDate> {
    last.checked_add_months(Months::new(MAINTENANCE_INTERVAL_MONTHS))
}

pub struct LocalEquipmentService {
    records: Mutex<Vec<Equipment>>,
    next_id: AtomicI64,
    clock: Clock,
}

impl Default for LocalEquipmentService {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalEquipmentService {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            clock: system_clock(),
        }
    }

    /// Seeds the table; ids continue after the highest seeded id
    pub fn with_records(records: Vec<Equipment>) -> Self {
        let max_id = records.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            records: Mutex::new(records),
            next_id: AtomicI64::new(max_id + 1),
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn snapshot(&self) -> ConsoleResult<Vec<Equipment>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> ConsoleResult<std::sync::MutexGuard<'_, Vec<Equipment>>> {
        self.records
            .lock()
            .map_err(|e| ConsoleError::service(format!("Equipment table unavailable: {}", e)))
    }

    fn set_status(&self, id: EquipmentId, operation: LifecycleOperation) -> ConsoleResult<Equipment> {
        let today = (self.clock)();
        let mut records = self.lock()?;
        let record = records
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ConsoleError::equipment_not_found(id))?;

        if record.status == operation.target() {
            log::debug!("Equipment {} already {}", id, record.status);
            return Ok(record.clone());
        }

        record.status = operation.target();
        if record.status == EquipmentStatus::Maintenance {
            record.last_maintenance = Some(today);
            record.next_maintenance = next_maintenance_after(today);
        }
        log::info!("Equipment {} is now {}", id, record.status);
        Ok(record.clone())
    }
}

#[async_trait]
impl EquipmentService for LocalEquipmentService {
    async fn search(&self, params: &SearchParams) -> ConsoleResult<Vec<Equipment>> {
        let records = self.lock()?;
        Ok(records.iter().filter(|e| params.matches(e)).cloned().collect())
    }

    async fn create(&self, data: &CreateEquipmentRequest) -> ConsoleResult<Equipment> {
        let mut records = self.lock()?;
        let name = data.name.trim();
        if records.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
            return Err(ConsoleError::equipment_already_exists(name));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let next_maintenance = data
            .next_maintenance
            .or_else(|| data.last_maintenance.and_then(next_maintenance_after));
        let equipment = Equipment {
            id,
            name: name.to_string(),
            status: data.status,
            last_maintenance: data.last_maintenance,
            next_maintenance,
            technical_spec: data.technical_spec.clone(),
        };
        records.push(equipment.clone());
        log::info!("Created equipment {} '{}'", id, equipment.name);
        Ok(equipment)
    }

    async fn update(&self, id: EquipmentId, data: &UpdateEquipmentRequest) -> ConsoleResult<Equipment> {
        let mut records = self.lock()?;
        let name = data.name.trim();
        if records.iter().any(|e| e.id != id && e.name.eq_ignore_ascii_case(name)) {
            return Err(ConsoleError::equipment_already_exists(name));
        }

        let record = records
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ConsoleError::equipment_not_found(id))?;
        record.name = name.to_string();
        record.status = data.status;
        record.last_maintenance = data.last_maintenance;
        record.next_maintenance = data
            .next_maintenance
            .or_else(|| data.last_maintenance.and_then(next_maintenance_after));
        record.technical_spec = data.technical_spec.clone();
        Ok(record.clone())
    }

    async fn to_maintenance(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.set_status(id, LifecycleOperation::ToMaintenance)
    }

    async fn activate(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.set_status(id, LifecycleOperation::Activate)
    }
}
