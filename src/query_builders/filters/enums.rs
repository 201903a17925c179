// src/query_builders/filters/enums.rs
//! Status enums generated through a single `define_status_enum!` macro

use serde::{Serialize, Deserialize};

/// Generates a status enum with as_str, from_str, is_valid and Display.
/// The string value is the wire token used by the equipment service.
macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $str_val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        $vis enum $name {
            $(
                #[serde(rename = $str_val)]
                $variant
            ),+
        }

        impl $name {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str_val ),+
                }
            }

            /// Case-insensitive, whitespace-tolerant token lookup
            pub fn from_str(s: &str) -> Option<Self> {
                match s.trim().to_lowercase().as_str() {
                    $( $str_val => Some($name::$variant), )+
                    _ => None,
                }
            }

            #[inline]
            pub fn is_valid(s: &str) -> bool {
                Self::from_str(s).is_some()
            }

            pub const fn all_values() -> &'static [&'static str] {
                &[ $( $str_val ),+ ]
            }

            pub const fn all() -> &'static [$name] {
                &[ $( $name::$variant ),+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_str(s).ok_or_else(|| format!("Invalid {}: '{}'", stringify!($name), s))
            }
        }
    };
}

// ==================== EQUIPMENT STATUS ====================

define_status_enum! {
    /// Equipment lifecycle status.
    ///
    /// Variant order is the natural sort order used by the table:
    /// - Active: available on the floor
    /// - Maintenance: out of service until activated again
    pub enum EquipmentStatus {
        Active => "activo",
        Maintenance => "mantenimiento",
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Active
    }
}

impl EquipmentStatus {
    /// Human-readable label for summaries and table cells
    pub const fn label(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "Active",
            EquipmentStatus::Maintenance => "Maintenance",
        }
    }
}

// ==================== TESTS ====================
