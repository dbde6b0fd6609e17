//! Mutation operations over customer records.
//!
//! Every write goes through [`CommandHandler`], which loads a record,
//! applies a domain command and stores the result with compare-and-swap,
//! retrying when another writer got there first.

pub mod error;
pub mod handler;
pub mod service;

pub use error::ServiceError;
pub use handler::{CommandHandler, CommandResult, MAX_CAS_ATTEMPTS};
pub use service::CustomerService;
