//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::InvalidId;
use mutations::ServiceError;
use query::QueryError;

use crate::response::Envelope;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Raw description of a 500, attached to the response so that
/// development deployments can reveal it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Input failed validation; `errors` lists every violated rule.
    Validation {
        message: String,
        errors: Vec<String>,
    },
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Email or mobile number already taken.
    Conflict(String),
    /// Internal server error. The message never reaches production clients.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Replaces the headline message of a validation failure.
    pub fn with_validation_message(self, headline: &str) -> Self {
        match self {
            ApiError::Validation { errors, .. } => ApiError::Validation {
                message: headline.to_string(),
                errors,
            },
            other => other,
        }
    }

    /// Tags the failure with the handler operation it interrupted.
    pub fn during(self, operation: &'static str) -> OperationError {
        OperationError {
            operation,
            error: self,
        }
    }

    /// Logs the failure and renders the error envelope.
    fn respond(self, operation: Option<&'static str>) -> Response {
        let status = self.status();

        match self {
            ApiError::Internal(detail) => {
                tracing::error!(operation, error = %detail, "internal server error");
                let mut response =
                    (status, Envelope::<()>::failure(INTERNAL_MESSAGE)).into_response();
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
            ApiError::Validation { message, errors } => {
                tracing::warn!(operation, %status, %message, ?errors, "request rejected");
                (status, Envelope::<()>::failure(message).with_errors(errors)).into_response()
            }
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => {
                tracing::warn!(operation, %status, %message, "request rejected");
                (status, Envelope::<()>::failure(message)).into_response()
            }
        }
    }
}

/// Extractor rejections; no handler has run yet.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.respond(None)
    }
}

/// A handler failure together with the operation name it is logged under.
#[derive(Debug)]
pub struct OperationError {
    pub operation: &'static str,
    pub error: ApiError,
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        self.error.respond(Some(self.operation))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation { message, errors } => ApiError::Validation {
                message,
                errors: errors.into_iter().map(|e| e.message).collect(),
            },
            ServiceError::Conflict { message, .. } => ApiError::Conflict(message),
            ServiceError::CustomerNotFound(_) => ApiError::NotFound("User not found".to_string()),
            ServiceError::AddressNotFound(_) => ApiError::NotFound("Address not found".to_string()),
            ServiceError::Contention(_) | ServiceError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidRequest(message) => ApiError::BadRequest(message.to_string()),
            QueryError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<InvalidId> for ApiError {
    fn from(err: InvalidId) -> Self {
        let message = match err.kind {
            "customer ID" => "Invalid user ID format",
            _ => "Invalid address ID format",
        };
        ApiError::BadRequest(message.to_string())
    }
}
