// src/query_builders/filters/params.rs
//! Translation of filter criteria and search term into the parameter shape
//! of the equipment service's search call.
//!
//! Translation is deterministic and lossless: every set criterion yields a
//! parameter. The same parameters evaluate locally through
//! [`SearchParams::matches`], which is what the offline service uses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Equipment;
use super::criteria::{DateRange, FilterCriteria};
use super::enums::EquipmentStatus;
use super::search::{name_contains, SearchInterpretation, StatusShortcutMode};

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estado: Option<EquipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fecha_ultimo_desde: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fecha_ultimo_hasta: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fecha_proximo_desde: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fecha_proximo_hasta: Option<NaiveDate>,
}

impl SearchParams {
    /// No parameter at all: the service returns the whole collection
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Builds the service parameters. An explicit status criterion from the
    /// filter panel takes precedence over a status shortcut typed in the
    /// search box.
    pub fn build(
        criteria: &FilterCriteria,
        interpretation: Option<&SearchInterpretation>,
        mode: StatusShortcutMode,
    ) -> Self {
        let name = interpretation
            .and_then(|i| i.name_term(mode))
            .map(str::to_string);
        let shortcut_status = interpretation.and_then(|i| i.status_term(mode));

        Self {
            name,
            estado: criteria.status.or(shortcut_status),
            fecha_ultimo_desde: criteria.last_maintenance_from,
            fecha_ultimo_hasta: criteria.last_maintenance_to,
            fecha_proximo_desde: criteria.next_maintenance_from,
            fecha_proximo_hasta: criteria.next_maintenance_to,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    /// Local evaluation with the same semantics the service applies
    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(name) = &self.name {
            if !name_contains(&equipment.name, name) {
                return false;
            }
        }
        let criteria = FilterCriteria {
            status: self.estado,
            last_maintenance_from: self.fecha_ultimo_desde,
            last_maintenance_to: self.fecha_ultimo_hasta,
            next_maintenance_from: self.fecha_proximo_desde,
            next_maintenance_to: self.fecha_proximo_hasta,
        };
        criteria.matches(equipment)
    }

    pub fn last_maintenance_range(&self) -> DateRange {
        DateRange::new(self.fecha_ultimo_desde, self.fecha_ultimo_hasta)
    }

    pub fn next_maintenance_range(&self) -> DateRange {
        DateRange::new(self.fecha_proximo_desde, self.fecha_proximo_hasta)
    }

    /// Query-string pairs using the REST backend's parameter names
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let date = |d: NaiveDate| d.format(QUERY_DATE_FORMAT).to_string();

        if let Some(name) = &self.name {
            pairs.push(("nombre", name.clone()));
        }
        if let Some(status) = self.estado {
            pairs.push(("estado", status.as_str().to_string()));
        }
        if let Some(d) = self.fecha_ultimo_desde {
            pairs.push(("ultimo_mantenimiento_min", date(d)));
        }
        if let Some(d) = self.fecha_ultimo_hasta {
            pairs.push(("ultimo_mantenimiento_max", date(d)));
        }
        if let Some(d) = self.fecha_proximo_desde {
            pairs.push(("proximo_mantenimiento_min", date(d)));
        }
        if let Some(d) = self.fecha_proximo_hasta {
            pairs.push(("proximo_mantenimiento_max", date(d)));
        }
        pairs
    }
}
