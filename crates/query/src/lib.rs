//! Read side for customer records.
//!
//! - [`ListParams`] turns raw query-string values into a query plan
//! - [`QueryEngine`] runs plans against a store and builds result pages
//! - [`NamedView`] holds the fixed listings built on the same engine

pub mod engine;
pub mod error;
pub mod page;
pub mod params;
pub mod views;

pub use engine::QueryEngine;
pub use error::{QueryError, Result};
pub use page::{Page, Pagination};
pub use params::{AppliedFilters, DEFAULT_PAGE_SIZE, ListParams, LocationParams, MAX_PAGE_SIZE};
pub use views::NamedView;
