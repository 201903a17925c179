// src/query_builders/filters/mod.rs
//! Filter predicate model: status enum, criteria, search interpretation and
//! the service parameter translation

pub mod criteria;
pub mod enums;
pub mod params;
pub mod search;

pub use criteria::{DateRange, FilterCriteria};
pub use enums::EquipmentStatus;
pub use params::SearchParams;
pub use search::{name_contains, SearchInterpretation, StatusShortcutMode};
