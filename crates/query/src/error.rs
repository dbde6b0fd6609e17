use customer_store::StoreError;
use thiserror::Error;

/// Errors that can occur while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request is missing something the query needs.
    #[error("{0}")]
    InvalidRequest(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
