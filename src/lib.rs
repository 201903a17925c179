// src/lib.rs
//! Equipment resource manager for a fitness facility admin console.
//!
//! The console keeps a local, observable projection of the equipment
//! collection held by a remote equipment service: debounced filtered
//! queries with last-request-wins ordering, server-confirmed lifecycle
//! transitions, derived stats, a single-slot notification channel and a
//! persisted search history.

pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod lifecycle;
pub mod models;
pub mod notification;
pub mod orchestrator;
pub mod projection;
pub mod query_builders;
pub mod services;
pub mod stats;
pub mod storage;
pub mod store;
pub mod validator;

pub use error::{ConsoleError, ConsoleResult};
pub use gateway::TransitionGateway;
pub use lifecycle::LifecycleOperation;
pub use models::{Equipment, EquipmentId};
pub use orchestrator::{QueryOrchestrator, QuerySettings};
pub use query_builders::{EquipmentStatus, FilterCriteria, SearchParams};
pub use store::{ConsoleState, LoadingState, StateStore};
