// src/services/mod.rs
//! Equipment service contract and its implementations.
//!
//! The remote service is the source of truth; the console only consumes it
//! through this narrow contract. Every failure carries the service's own
//! message, which callers forward verbatim.

pub mod http;
pub mod local;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::error::ConsoleResult;
use crate::lifecycle::LifecycleOperation;
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentId, UpdateEquipmentRequest};
use crate::query_builders::SearchParams;

pub use http::HttpEquipmentService;
pub use local::LocalEquipmentService;

#[async_trait]
pub trait EquipmentService: Send + Sync {
    /// Any subset of parameters may be absent; none returns the whole collection
    async fn search(&self, params: &SearchParams) -> ConsoleResult<Vec<Equipment>>;

    /// Returns the created record with its server-assigned id
    async fn create(&self, data: &CreateEquipmentRequest) -> ConsoleResult<Equipment>;

    /// Full-record update
    async fn update(&self, id: EquipmentId, data: &UpdateEquipmentRequest) -> ConsoleResult<Equipment>;

    async fn to_maintenance(&self, id: EquipmentId) -> ConsoleResult<Equipment>;

    async fn activate(&self, id: EquipmentId) -> ConsoleResult<Equipment>;

    /// Dispatches a lifecycle operation to its endpoint
    async fn transition(&self, id: EquipmentId, operation: LifecycleOperation) -> ConsoleResult<Equipment> {
        match operation {
            LifecycleOperation::ToMaintenance => self.to_maintenance(id).await,
            LifecycleOperation::Activate => self.activate(id).await,
        }
    }
}
