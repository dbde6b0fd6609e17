//! Route handlers.

use std::future::Future;

use crate::error::{ApiError, OperationError};

pub mod addresses;
pub mod customers;
pub mod health;
pub mod listings;
pub mod metrics;

/// Runs a handler body, tagging any failure with `name` so the error
/// response is logged against the operation that produced it.
pub(crate) async fn operation<T>(
    name: &'static str,
    body: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, OperationError> {
    body.await.map_err(|e| e.during(name))
}
