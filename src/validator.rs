// src/validator.rs - Form validation for equipment create/edit
use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use validator::Validate;

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{CreateEquipmentRequest, UpdateEquipmentRequest, MAX_NAME_LENGTH, MAX_SPEC_LENGTH};

// ==================== VALIDATION RESULT ====================

#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub errors: HashMap<String, Vec<String>>,
    pub warnings: HashMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
        for (field, warnings) in other.warnings {
            self.warnings.entry(field).or_default().extend(warnings);
        }
    }

    pub fn to_console_error(&self) -> ConsoleError {
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let message = fields
            .iter()
            .map(|(field, errors)| format!("{}: {}", field, errors.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");

        ConsoleError::Validation(message)
    }
}

// ==================== FIELD VALIDATORS ====================

pub struct FieldValidator;

impl FieldValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(format!("{} cannot be empty", field))
        } else {
            Ok(())
        }
    }

    /// Length in characters, not bytes
    pub fn length(value: &str, field: &str, min: Option<usize>, max: Option<usize>) -> Result<(), String> {
        let len = value.chars().count();

        if let Some(min_len) = min {
            if len < min_len {
                return Err(format!("{} must be at least {} characters", field, min_len));
            }
        }

        if let Some(max_len) = max {
            if len > max_len {
                return Err(format!("{} must not exceed {} characters", field, max_len));
            }
        }

        Ok(())
    }

    pub fn maintenance_dates(last: Option<NaiveDate>, next: Option<NaiveDate>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let (Some(last), Some(next)) = (last, next) {
            if next < last {
                result.add_error(
                    "next_maintenance",
                    "Next maintenance cannot be before the last maintenance",
                );
            }
        }

        if let Some(last) = last {
            if last > Local::now().date_naive() {
                result.add_warning("last_maintenance", "Last maintenance is dated in the future");
            }
        }

        result
    }
}

// ==================== CUSTOM VALIDATION ====================

pub trait CustomValidate {
    fn custom_validate(&self) -> ValidationResult;
}

fn check_name(name: &str, result: &mut ValidationResult) {
    if let Err(e) = FieldValidator::not_empty(name, "Name") {
        result.add_error("name", e);
    } else if let Err(e) = FieldValidator::length(name.trim(), "Name", None, Some(MAX_NAME_LENGTH as usize)) {
        result.add_error("name", e);
    }
}

fn check_spec(spec: Option<&str>, result: &mut ValidationResult) {
    if let Some(spec) = spec {
        if let Err(e) = FieldValidator::length(spec, "Technical specification", None, Some(MAX_SPEC_LENGTH as usize)) {
            result.add_error("technical_spec", e);
        }
    }
}

impl CustomValidate for CreateEquipmentRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_name(&self.name, &mut result);
        check_spec(self.technical_spec.as_deref(), &mut result);
        result.merge(FieldValidator::maintenance_dates(self.last_maintenance, self.next_maintenance));
        result
    }
}

impl CustomValidate for UpdateEquipmentRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_name(&self.name, &mut result);
        check_spec(self.technical_spec.as_deref(), &mut result);
        result.merge(FieldValidator::maintenance_dates(self.last_maintenance, self.next_maintenance));
        result
    }
}

/// Derive-level rules first, then the cross-field checks. Warnings are
/// logged and never block the submission.
pub fn validate_request<T: Validate + CustomValidate>(request: &T) -> ConsoleResult<()> {
    request.validate()?;

    let result = request.custom_validate();
    for (field, warnings) in &result.warnings {
        log::warn!("{}: {}", field, warnings.join(", "));
    }
    if result.is_valid() {
        Ok(())
    } else {
        Err(result.to_console_error())
    }
}
