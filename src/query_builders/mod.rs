// src/query_builders/mod.rs
//! Query building for the equipment list: filter criteria, search box
//! interpretation and translation into service parameters

pub mod filters;

// Re-export the main types
pub use filters::{
    name_contains, DateRange, EquipmentStatus, FilterCriteria, SearchInterpretation,
    SearchParams, StatusShortcutMode,
};
