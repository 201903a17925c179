// src/query_builders/filters/search.rs
//! Interpretation of the free-text search box.
//!
//! The box is dual-mode: a plain term searches equipment names, while a
//! recognized status token ("activo" / "mantenimiento") is a status
//! shortcut. The interpretation is resolved once per term change and
//! carried alongside the term so the surface can show which mode is active.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::enums::EquipmentStatus;

/// How a status shortcut affects the query sent to the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusShortcutMode {
    /// The shortcut becomes a status filter and the name search is dropped
    #[default]
    Narrow,
    /// The term is still searched as a name; the shortcut only drives the hint
    HintOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SearchInterpretation {
    Name { value: String },
    StatusShortcut { value: String, status: EquipmentStatus },
}

impl SearchInterpretation {
    /// `None` for a blank term
    pub fn resolve(term: &str) -> Option<Self> {
        let value = term.trim();
        if value.is_empty() {
            return None;
        }
        let value = value.to_string();
        match EquipmentStatus::from_str(&value) {
            Some(status) => Some(SearchInterpretation::StatusShortcut { value, status }),
            None => Some(SearchInterpretation::Name { value }),
        }
    }

    /// The trimmed term as typed
    pub fn value(&self) -> &str {
        match self {
            SearchInterpretation::Name { value } => value,
            SearchInterpretation::StatusShortcut { value, .. } => value,
        }
    }

    pub fn status(&self) -> Option<EquipmentStatus> {
        match self {
            SearchInterpretation::Name { .. } => None,
            SearchInterpretation::StatusShortcut { status, .. } => Some(*status),
        }
    }

    pub fn is_status_shortcut(&self) -> bool {
        matches!(self, SearchInterpretation::StatusShortcut { .. })
    }

    /// Name term the query should carry under `mode`
    pub fn name_term(&self, mode: StatusShortcutMode) -> Option<&str> {
        match (self, mode) {
            (SearchInterpretation::Name { value }, _) => Some(value),
            (SearchInterpretation::StatusShortcut { value, .. }, StatusShortcutMode::HintOnly) => Some(value),
            (SearchInterpretation::StatusShortcut { .. }, StatusShortcutMode::Narrow) => None,
        }
    }

    /// Status the query should carry under `mode`
    pub fn status_term(&self, mode: StatusShortcutMode) -> Option<EquipmentStatus> {
        match mode {
            StatusShortcutMode::Narrow => self.status(),
            StatusShortcutMode::HintOnly => None,
        }
    }

    /// Hint shown next to the search box
    pub fn hint(&self, mode: StatusShortcutMode) -> String {
        match (self, mode) {
            (SearchInterpretation::Name { .. }, _) => {
                "Searching by equipment name".to_string()
            }
            (SearchInterpretation::StatusShortcut { status, .. }, StatusShortcutMode::Narrow) => {
                format!("Showing equipment with status {}", status.label())
            }
            (SearchInterpretation::StatusShortcut { value, status }, StatusShortcutMode::HintOnly) => {
                format!(
                    "Searching names for \"{}\" ({} is a status keyword, use the status filter to narrow)",
                    value,
                    status.label()
                )
            }
        }
    }
}

/// Case-insensitive substring match on the equipment name
pub fn name_contains(name: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase())
}
