//! Request validation helpers.
//!
//! Errors are collected rather than returned on the first failure so that a
//! caller can fix every field in one round trip.

use std::fmt;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
    }

    pub fn invalid_identifier(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' is not a valid placeholder name", value))
            .with_suggestion("Use only letters, digits and underscores, e.g. client_name")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn to_message(&self) -> String {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        format!(
            "validation failed ({} error(s)): {}",
            self.errors.len(),
            parts.join("; ")
        )
    }

    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self.to_message()))
        }
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Placeholder identifiers: ASCII letters, digits and underscores.
pub fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_identifiers(values: &[String], field: &str, errors: &mut ValidationErrors) {
    for value in values {
        if !is_identifier(value) {
            errors.add(ValidationError::invalid_identifier(field, value));
        }
    }
}

pub fn validate_non_negative(value: i32, field: &str, errors: &mut ValidationErrors) {
    if value < 0 {
        errors.add(ValidationError::new(field, "must not be negative"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_error() {
        let mut errors = ValidationErrors::new();
        validate_required("  ", "name", "Name", &mut errors);
        validate_identifiers(
            &["client_name".to_string(), "client-name".to_string()],
            "variables",
            &mut errors,
        );
        validate_non_negative(-1, "order_index", &mut errors);

        assert_eq!(errors.len(), 3);
        let message = errors.to_message();
        assert!(message.contains("[name]"));
        assert!(message.contains("client-name"));
        assert!(message.contains("[order_index]"));
    }

    #[test]
    fn test_empty_collection_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("contract_date"));
        assert!(is_identifier("Valor2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("client name"));
    }
}
