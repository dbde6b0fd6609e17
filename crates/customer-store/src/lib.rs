pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod version;

pub use common::CustomerId;
pub use error::{ContactField, Result, StoreError};
pub use memory::InMemoryCustomerStore;
pub use postgres::PostgresCustomerStore;
pub use query::{AddressCount, AddressFilter, CustomerQuery, QueryResult, Sort, SortDirection, SortField};
pub use store::{CustomerStore, CustomerStoreExt, Stored};
pub use version::Version;
