//! Response envelope and customer representation.

use axum::Json;
use axum::response::{IntoResponse, Response};
use domain::{Address, CustomerRecord};
use query::Page;
use serde::Serialize;

/// Body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: None,
            error: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Number of items a payload carries, for success logging.
pub trait DataCount {
    fn data_count(&self) -> usize;
}

impl<T> DataCount for Vec<T> {
    fn data_count(&self) -> usize {
        self.len()
    }
}

impl<T> DataCount for Page<T> {
    fn data_count(&self) -> usize {
        self.users.len()
    }
}

impl DataCount for CustomerResponse {
    fn data_count(&self) -> usize {
        1
    }
}

/// Logs the completed operation and wraps `data` in a success envelope.
pub fn success<T: DataCount>(operation: &'static str, message: impl Into<String>, data: T) -> Envelope<T> {
    let message = message.into();
    tracing::info!(operation, data_count = data.data_count(), %message, "operation succeeded");
    Envelope::ok(message, data)
}

/// A customer record as returned to clients, with its derived fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    #[serde(flatten)]
    pub record: CustomerRecord,
    pub full_name: String,
    pub default_address: Option<Address>,
}

impl From<CustomerRecord> for CustomerResponse {
    fn from(record: CustomerRecord) -> Self {
        Self {
            full_name: record.full_name(),
            default_address: record.default_address().cloned(),
            record,
        }
    }
}

pub fn customers(records: Vec<CustomerRecord>) -> Vec<CustomerResponse> {
    records.into_iter().map(CustomerResponse::from).collect()
}
