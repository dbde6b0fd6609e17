use thiserror::Error;

use crate::{CustomerId, Version};

/// A contact field that must be unique across all customer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Email,
    Mobile,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::Mobile => "mobile",
        }
    }

    /// Name of the database unique constraint guarding this field.
    pub fn constraint(&self) -> &'static str {
        match self {
            ContactField::Email => "customers_email_key",
            ContactField::Mobile => "customers_mobile_key",
        }
    }

    pub(crate) fn from_constraint(name: &str) -> Option<Self> {
        [ContactField::Email, ContactField::Mobile]
            .into_iter()
            .find(|f| f.constraint() == name)
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when interacting with the customer store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another record already holds this email or mobile number.
    #[error("Unique constraint violated on {field}")]
    UniqueViolation { field: ContactField },

    /// The record changed since it was read.
    #[error(
        "Version conflict for customer {customer_id}: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        customer_id: CustomerId,
        expected: Version,
        actual: Version,
    },

    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for customer store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
