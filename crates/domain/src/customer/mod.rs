//! Customer aggregate and its owned address collection.

mod address;
mod address_set;
mod inputs;
mod record;
mod value_objects;

pub use address::{Address, AddressDraft, AddressPatch, DEFAULT_COUNTRY};
pub use address_set::{AddressOutcome, AddressSet, DefaultState};
pub use inputs::{CustomerPatch, NewCustomer};
pub use record::CustomerRecord;
pub use value_objects::{AddressType, CustomerStatus, Gender, ParseEnumError};
