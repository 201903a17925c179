// src/lifecycle.rs
//! Equipment lifecycle state machine.
//!
//! Two states and two transitions, cycling indefinitely:
//! - `activo -> mantenimiento` (send to maintenance)
//! - `mantenimiento -> activo` (activate)
//!
//! There is no terminal state. Asking for a transition from the state it
//! does not leave is a caller error; surfaces should offer
//! [`EquipmentStatus::next_operation`] as a toggle instead of a choice.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{ConsoleError, ConsoleResult};
use crate::query_builders::EquipmentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOperation {
    #[strum(to_string = "to_maintenance", serialize = "toMaintenance")]
    ToMaintenance,
    Activate,
}

impl LifecycleOperation {
    /// State the operation leaves
    pub const fn source(&self) -> EquipmentStatus {
        match self {
            LifecycleOperation::ToMaintenance => EquipmentStatus::Active,
            LifecycleOperation::Activate => EquipmentStatus::Maintenance,
        }
    }

    /// State the operation enters
    pub const fn target(&self) -> EquipmentStatus {
        match self {
            LifecycleOperation::ToMaintenance => EquipmentStatus::Maintenance,
            LifecycleOperation::Activate => EquipmentStatus::Active,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            LifecycleOperation::ToMaintenance => "Send to maintenance",
            LifecycleOperation::Activate => "Activate",
        }
    }

    pub const fn success_message(&self) -> &'static str {
        match self {
            LifecycleOperation::ToMaintenance => "Equipment sent to maintenance",
            LifecycleOperation::Activate => "Equipment activated",
        }
    }

    /// Checks that the operation leaves `current`
    pub fn check(&self, current: EquipmentStatus) -> ConsoleResult<()> {
        if current == self.source() {
            Ok(())
        } else {
            let verb = match self {
                LifecycleOperation::ToMaintenance => "send to maintenance",
                LifecycleOperation::Activate => "activate",
            };
            Err(ConsoleError::invalid_transition(verb, current.as_str()))
        }
    }
}

impl EquipmentStatus {
    /// The single valid transition out of this state
    pub const fn next_operation(&self) -> LifecycleOperation {
        match self {
            EquipmentStatus::Active => LifecycleOperation::ToMaintenance,
            EquipmentStatus::Maintenance => LifecycleOperation::Activate,
        }
    }

    /// State reached by applying `operation`, if it is valid from here
    pub fn apply(&self, operation: LifecycleOperation) -> ConsoleResult<EquipmentStatus> {
        operation.check(*self)?;
        Ok(operation.target())
    }
}
