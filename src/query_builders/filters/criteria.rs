// src/query_builders/filters/criteria.rs
//! Filter criteria for the equipment list and their predicate evaluation.
//!
//! Criteria are immutable values: the filter panel replaces them wholesale
//! on every edit. Evaluation is conjunctive over every set criterion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Equipment;
use super::enums::EquipmentStatus;

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

// ==================== DATE RANGE ====================

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn since(from: NaiveDate) -> Self {
        Self { from: Some(from), to: None }
    }

    pub fn until(to: NaiveDate) -> Self {
        Self { from: None, to: Some(to) }
    }

    /// No bound on either side
    #[inline]
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// A record without a date fails any bounded range
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// "15/03/2024 - 20/03/2024", "From 15/03/2024", "Until 20/03/2024"
    pub fn describe(&self) -> Option<String> {
        let fmt = |d: NaiveDate| d.format(DISPLAY_DATE_FORMAT).to_string();
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(format!("{} - {}", fmt(from), fmt(to))),
            (Some(from), None) => Some(format!("From {}", fmt(from))),
            (None, Some(to)) => Some(format!("Until {}", fmt(to))),
            (None, None) => None,
        }
    }
}

// ==================== FILTER CRITERIA ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub status: Option<EquipmentStatus>,
    pub last_maintenance_from: Option<NaiveDate>,
    pub last_maintenance_to: Option<NaiveDate>,
    pub next_maintenance_from: Option<NaiveDate>,
    pub next_maintenance_to: Option<NaiveDate>,
}

impl FilterCriteria {
    /// All criteria cleared
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_last_maintenance(mut self, range: DateRange) -> Self {
        self.last_maintenance_from = range.from;
        self.last_maintenance_to = range.to;
        self
    }

    pub fn with_next_maintenance(mut self, range: DateRange) -> Self {
        self.next_maintenance_from = range.from;
        self.next_maintenance_to = range.to;
        self
    }

    pub fn last_maintenance_range(&self) -> DateRange {
        DateRange::new(self.last_maintenance_from, self.last_maintenance_to)
    }

    pub fn next_maintenance_range(&self) -> DateRange {
        DateRange::new(self.next_maintenance_from, self.next_maintenance_to)
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.last_maintenance_range().is_open()
            && self.next_maintenance_range().is_open()
    }

    pub fn active_count(&self) -> usize {
        [
            self.status.is_some(),
            self.last_maintenance_from.is_some(),
            self.last_maintenance_to.is_some(),
            self.next_maintenance_from.is_some(),
            self.next_maintenance_to.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(status) = self.status {
            if equipment.status != status {
                return false;
            }
        }
        self.last_maintenance_range().admits(equipment.last_maintenance)
            && self.next_maintenance_range().admits(equipment.next_maintenance)
    }

    /// Keeps the matching records in their original order
    pub fn apply(&self, collection: &[Equipment]) -> Vec<Equipment> {
        collection
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }

    /// Active filter chips, in panel order
    pub fn describe(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if let Some(status) = self.status {
            chips.push(format!("Status: {}", status.label()));
        }
        if let Some(range) = self.last_maintenance_range().describe() {
            chips.push(format!("Last: {}", range));
        }
        if let Some(range) = self.next_maintenance_range().describe() {
            chips.push(format!("Next: {}", range));
        }
        chips
    }
}
