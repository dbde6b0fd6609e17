//! Domain layer for the customer registry.
//!
//! This crate holds the pure, I/O-free rules of the system:
//! - [`AddressSet`] with its single-default and single-address invariants
//! - [`CustomerRecord`], the aggregate root owning one address set
//! - Field validation that aggregates every violation into one error

pub mod customer;
pub mod error;
pub mod validation;

pub use customer::{
    Address, AddressDraft, AddressOutcome, AddressPatch, AddressSet, AddressType, CustomerPatch,
    CustomerRecord, CustomerStatus, DEFAULT_COUNTRY, DefaultState, Gender, NewCustomer,
};
pub use error::{DomainError, FieldError};
