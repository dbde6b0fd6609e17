//! Shared types for the customer registry.

pub mod actor;
pub mod types;

pub use actor::{Actor, SYSTEM_ACTOR};
pub use types::{AddressId, CustomerId, InvalidId};
