// src/models/mod.rs

pub mod equipment;

// Re-export so structs are reachable as crate::models::StructName
pub use equipment::*;
