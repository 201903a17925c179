// src/stats.rs
//! Derived counts over the equipment collection.
//!
//! Stats are never stored independently; they are recomputed from the
//! collection on every change against a caller-supplied "today".

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Equipment;
use crate::query_builders::EquipmentStatus;

pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsPolicy {
    /// Forward window, in days, for "upcoming maintenance"
    pub upcoming_window_days: i64,
    /// Age, in days, at which the last maintenance counts as stale
    pub stale_after_days: i64,
}

impl Default for StatsPolicy {
    fn default() -> Self {
        Self {
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    /// Next maintenance due today or within the forward window
    pub upcoming: usize,
    /// Next maintenance date already past
    pub overdue: usize,
    /// Last maintenance at least `stale_after_days` ago
    pub stale: usize,
    /// Last maintenance within the threshold, or never serviced
    pub recent: usize,
}

pub fn compute_stats(collection: &[Equipment], today: NaiveDate) -> DerivedStats {
    compute_stats_with(collection, today, &StatsPolicy::default())
}

pub fn compute_stats_with(
    collection: &[Equipment],
    today: NaiveDate,
    policy: &StatsPolicy,
) -> DerivedStats {
    let mut stats = DerivedStats {
        total: collection.len(),
        ..DerivedStats::default()
    };

    for equipment in collection {
        match equipment.status {
            EquipmentStatus::Active => stats.active += 1,
            EquipmentStatus::Maintenance => stats.maintenance += 1,
        }

        match equipment.days_until_next_maintenance(today) {
            Some(days) if days < 0 => stats.overdue += 1,
            Some(days) if days <= policy.upcoming_window_days => stats.upcoming += 1,
            _ => {}
        }

        // never serviced is not a violation
        match equipment.days_since_last_maintenance(today) {
            Some(days) if days >= policy.stale_after_days => stats.stale += 1,
            _ => stats.recent += 1,
        }
    }

    stats
}

// ==================== CLOCK ====================

/// Source of "today" for stats and maintenance stamping
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

pub fn fixed_clock(today: NaiveDate) -> Clock {
    Arc::new(move || today)
}
