use common::{AddressId, CustomerId};
use customer_store::{ContactField, StoreError};
use domain::{DomainError, FieldError};
use thiserror::Error;

/// Errors returned by mutation operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation. `errors` lists every violated field.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Another customer already holds this email or mobile number.
    #[error("{message}")]
    Conflict {
        field: ContactField,
        message: String,
    },

    #[error("User not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Address not found: {0}")]
    AddressNotFound(AddressId),

    /// Compare-and-swap kept losing to concurrent writers.
    #[error("Customer {0} was modified concurrently, please retry")]
    Contention(CustomerId),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    /// Conflict raised when registering a new customer.
    pub fn duplicate(field: ContactField) -> Self {
        let message = match field {
            ContactField::Email => "User with this email already exists",
            ContactField::Mobile => "User with this mobile number already exists",
        };
        ServiceError::Conflict {
            field,
            message: message.to_string(),
        }
    }

    /// Conflict raised when an edit would take another customer's contact.
    pub fn taken_by_other(field: ContactField) -> Self {
        let message = match field {
            ContactField::Email => "Email already exists for another user",
            ContactField::Mobile => "Mobile number already exists for another user",
        };
        ServiceError::Conflict {
            field,
            message: message.to_string(),
        }
    }

    pub fn invalid_status() -> Self {
        let message = "Valid status (Active/InActive) is required";
        ServiceError::Validation {
            message: message.to_string(),
            errors: vec![FieldError::new("status", message)],
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ServiceError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { errors } => ServiceError::Validation {
                message: "Validation failed".to_string(),
                errors,
            },
            DomainError::AddressNotFound(id) => ServiceError::AddressNotFound(id),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation { field } => ServiceError::duplicate(field),
            StoreError::NotFound(id) => ServiceError::CustomerNotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_violations_become_specific_conflicts() {
        let err: ServiceError = StoreError::UniqueViolation {
            field: ContactField::Mobile,
        }
        .into();
        assert_eq!(err.to_string(), "User with this mobile number already exists");
    }

    #[test]
    fn domain_validation_keeps_field_errors() {
        let err: ServiceError = DomainError::invalid("pincode", "bad").into();
        assert_eq!(err.to_string(), "Validation failed");
        assert_eq!(err.field_errors()[0].field, "pincode");
    }
}
