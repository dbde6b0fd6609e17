use async_trait::async_trait;
use domain::CustomerRecord;

use crate::{ContactField, CustomerId, CustomerQuery, QueryResult, Result, StoreError, Version};

/// A customer record together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub record: CustomerRecord,
    pub version: Version,
}

/// Core trait for customer record persistence.
///
/// Every write is atomic per record. Email and mobile uniqueness is
/// enforced by the store itself and reported as
/// [`StoreError::UniqueViolation`], whatever checks callers ran before.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Inserts a new record at [`Version::first`].
    async fn insert(&self, record: CustomerRecord) -> Result<Version>;

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Stored>>;

    /// Reports whether any record other than `exclude` holds `value` in
    /// the given contact field.
    async fn contact_in_use(
        &self,
        field: ContactField,
        value: &str,
        exclude: Option<CustomerId>,
    ) -> Result<bool>;

    /// Replaces a record if it is still at `expected`.
    ///
    /// Fails with `VersionConflict` if another write got there first and
    /// with `NotFound` if the record is gone. Returns the new version.
    async fn update(&self, record: CustomerRecord, expected: Version) -> Result<Version>;

    /// Removes a record and returns it, or `None` if it did not exist.
    async fn delete(&self, id: CustomerId) -> Result<Option<CustomerRecord>>;

    /// Runs a query plan, returning one window of matches plus the total
    /// match count.
    async fn query(&self, query: &CustomerQuery) -> Result<QueryResult>;
}

/// Extension trait providing convenience methods for customer stores.
#[async_trait]
pub trait CustomerStoreExt: CustomerStore {
    /// Loads a record, failing with `NotFound` if it does not exist.
    async fn get(&self, id: CustomerId) -> Result<Stored> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn exists(&self, id: CustomerId) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

impl<T: CustomerStore + ?Sized> CustomerStoreExt for T {}
