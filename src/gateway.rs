// src/gateway.rs
//! Lifecycle transitions against the service, with the local record patched
//! only after the service confirms.
//!
//! No optimistic update: until the call resolves the row keeps its previous
//! state, and a failed call leaves the collection untouched.

use std::sync::Arc;

use crate::error::{ConsoleError, ConsoleResult};
use crate::lifecycle::LifecycleOperation;
use crate::models::{Equipment, EquipmentId};
use crate::notification::{Notification, Notifier};
use crate::services::EquipmentService;
use crate::store::StateStore;

#[derive(Clone)]
pub struct TransitionGateway {
    service: Arc<dyn EquipmentService>,
    notifier: Arc<dyn Notifier>,
    store: StateStore,
}

impl TransitionGateway {
    pub fn new(service: Arc<dyn EquipmentService>, notifier: Arc<dyn Notifier>, store: StateStore) -> Self {
        Self { service, notifier, store }
    }

    /// Applies `operation` to the record with `id`. An operation that does not
    /// leave the record's current state is rejected without a service call.
    pub async fn transition(&self, id: EquipmentId, operation: LifecycleOperation) -> ConsoleResult<Equipment> {
        let current = self
            .store
            .snapshot()
            .find(id)
            .map(|e| e.status)
            .ok_or_else(|| ConsoleError::equipment_not_found(id))?;
        operation.check(current)?;

        log::info!("Equipment {}: {}", id, operation);
        match self.service.transition(id, operation).await {
            Ok(updated) => {
                if updated.status != operation.target() {
                    log::warn!(
                        "Service returned equipment {} as {} after {}",
                        id, updated.status, operation
                    );
                }
                if !self.store.patch_record(updated.clone()) {
                    log::debug!("Equipment {} left the collection before the transition resolved", id);
                }
                self.notifier.show(Notification::success(operation.success_message()));
                Ok(updated)
            }
            Err(e) => {
                self.notifier.show(Notification::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Applies the single valid transition out of the record's current state
    pub async fn toggle(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        let operation = self
            .store
            .snapshot()
            .find(id)
            .map(|e| e.status.next_operation())
            .ok_or_else(|| ConsoleError::equipment_not_found(id))?;
        self.transition(id, operation).await
    }
}
