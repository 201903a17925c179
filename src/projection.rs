// src/projection.rs
//! Client-side table projection: sorting the current collection.
//!
//! Sorting is stable, so records with equal keys keep their relative
//! order from the service response.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::models::Equipment;

// ==================== SORT PARAMETERS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Status,
    LastMaintenance,
    NextMaintenance,
}

impl SortField {
    pub const fn all() -> &'static [SortField] {
        &[
            SortField::Name,
            SortField::Status,
            SortField::LastMaintenance,
            SortField::NextMaintenance,
        ]
    }

    pub const fn header(&self) -> &'static str {
        match self {
            SortField::Name => "Equipment",
            SortField::Status => "Status",
            SortField::LastMaintenance => "Last Maintenance",
            SortField::NextMaintenance => "Next Maintenance",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn is_desc(&self) -> bool {
        *self == SortDirection::Desc
    }
}

/// Column the table is sorted by; `field: None` keeps service order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(field: SortField, direction: SortDirection) -> Self {
        Self { field: Some(field), direction }
    }

    /// Header click: the same field flips direction, a new field starts ascending
    pub fn toggle(&self, field: SortField) -> Self {
        if self.field == Some(field) {
            Self { field: Some(field), direction: self.direction.flipped() }
        } else {
            Self { field: Some(field), direction: SortDirection::Asc }
        }
    }

    pub fn apply(&self, collection: &[Equipment]) -> Vec<Equipment> {
        match self.field {
            Some(field) => sort_equipment(collection, field, self.direction),
            None => collection.to_vec(),
        }
    }
}

// ==================== SORTING ====================

/// Missing dates sort after present ones in ascending order
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_by(a: &Equipment, b: &Equipment, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Status => a.status.cmp(&b.status),
        SortField::LastMaintenance => compare_dates(a.last_maintenance, b.last_maintenance),
        SortField::NextMaintenance => compare_dates(a.next_maintenance, b.next_maintenance),
    }
}

pub fn sort_equipment(
    collection: &[Equipment],
    field: SortField,
    direction: SortDirection,
) -> Vec<Equipment> {
    let mut sorted = collection.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        if direction.is_desc() {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}
