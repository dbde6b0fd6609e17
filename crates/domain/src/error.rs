//! Domain error types.

use common::AddressId;
use thiserror::Error;

/// A single violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors that can occur while applying domain rules.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// One or more fields failed validation. Never empty.
    #[error("Validation failed: {}", join_messages(.errors))]
    Validation { errors: Vec<FieldError> },

    /// The address id does not belong to the record.
    #[error("Address not found: {0}")]
    AddressNotFound(AddressId),
}

impl DomainError {
    /// Builds a validation error for a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Returns the field errors for a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DomainError::Validation { errors } => errors,
            DomainError::AddressNotFound(_) => &[],
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
