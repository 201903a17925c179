// src/models/equipment.rs
//! Equipment record and the create/edit request bodies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::query_builders::EquipmentStatus;

/// Server-assigned equipment identifier
pub type EquipmentId = i64;

/// Maximum length of the equipment name column on the service side
pub const MAX_NAME_LENGTH: u64 = 100;

/// Maximum length accepted for the technical specification text
pub const MAX_SPEC_LENGTH: u64 = 2000;

// ==================== EQUIPMENT ====================

/// A piece of gym equipment as confirmed by the equipment service.
///
/// Field names on the wire follow the service (`id_equipo`, `nombre_equipo`,
/// `estado`, ...); English aliases are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "id_equipo", alias = "id")]
    pub id: EquipmentId,

    #[serde(rename = "nombre_equipo", alias = "name")]
    pub name: String,

    #[serde(rename = "estado", alias = "status", default)]
    pub status: EquipmentStatus,

    #[serde(rename = "ultimo_mantenimiento", alias = "last_maintenance", default)]
    pub last_maintenance: Option<NaiveDate>,

    #[serde(rename = "proximo_mantenimiento", alias = "next_maintenance", default)]
    pub next_maintenance: Option<NaiveDate>,

    #[serde(rename = "especificaciones_tecnicas", alias = "technical_spec", default)]
    pub technical_spec: Option<String>,
}

impl Equipment {
    pub fn new(id: EquipmentId, name: impl Into<String>, status: EquipmentStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            last_maintenance: None,
            next_maintenance: None,
            technical_spec: None,
        }
    }

    pub fn with_last_maintenance(mut self, date: Option<NaiveDate>) -> Self {
        self.last_maintenance = date;
        self
    }

    pub fn with_next_maintenance(mut self, date: Option<NaiveDate>) -> Self {
        self.next_maintenance = date;
        self
    }

    pub fn with_technical_spec(mut self, spec: impl Into<String>) -> Self {
        self.technical_spec = Some(spec.into());
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EquipmentStatus::Active
    }

    /// Signed number of days from `today` to the next maintenance date
    pub fn days_until_next_maintenance(&self, today: NaiveDate) -> Option<i64> {
        self.next_maintenance.map(|next| (next - today).num_days())
    }

    /// Number of days since the last maintenance, negative if dated in the future
    pub fn days_since_last_maintenance(&self, today: NaiveDate) -> Option<i64> {
        self.last_maintenance.map(|last| (today - last).num_days())
    }
}

// ==================== REQUESTS ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[serde(rename = "nombre_equipo")]
    pub name: String,

    #[serde(rename = "estado", default)]
    pub status: EquipmentStatus,

    #[serde(rename = "ultimo_mantenimiento", skip_serializing_if = "Option::is_none", default)]
    pub last_maintenance: Option<NaiveDate>,

    #[serde(rename = "proximo_mantenimiento", skip_serializing_if = "Option::is_none", default)]
    pub next_maintenance: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Technical specification cannot exceed 2000 characters"))]
    #[serde(rename = "especificaciones_tecnicas", skip_serializing_if = "Option::is_none", default)]
    pub technical_spec: Option<String>,
}

impl CreateEquipmentRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: EquipmentStatus::Active,
            last_maintenance: None,
            next_maintenance: None,
            technical_spec: None,
        }
    }
}

/// Full-record edit: every attribute is sent, the service replaces the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateEquipmentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[serde(rename = "nombre_equipo")]
    pub name: String,

    #[serde(rename = "estado")]
    pub status: EquipmentStatus,

    #[serde(rename = "ultimo_mantenimiento")]
    pub last_maintenance: Option<NaiveDate>,

    #[serde(rename = "proximo_mantenimiento", skip_serializing_if = "Option::is_none", default)]
    pub next_maintenance: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Technical specification cannot exceed 2000 characters"))]
    #[serde(rename = "especificaciones_tecnicas")]
    pub technical_spec: Option<String>,
}

impl From<&Equipment> for UpdateEquipmentRequest {
    /// Pre-fills the edit form from the current record
    fn from(equipment: &Equipment) -> Self {
        Self {
            name: equipment.name.clone(),
            status: equipment.status,
            last_maintenance: equipment.last_maintenance,
            next_maintenance: equipment.next_maintenance,
            technical_spec: equipment.technical_spec.clone(),
        }
    }
}
