use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::CustomerRecord;
use tokio::sync::RwLock;

use crate::{
    ContactField, CustomerId, CustomerQuery, QueryResult, Result, StoreError, Version,
    store::{CustomerStore, Stored},
};

/// In-memory customer store.
///
/// Uniqueness checks and compare-and-swap run under one write lock, so this
/// store gives the same guarantees as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryCustomerStore {
    records: Arc<RwLock<HashMap<CustomerId, Stored>>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

fn contact_value(record: &CustomerRecord, field: ContactField) -> &str {
    match field {
        ContactField::Email => record.email(),
        ContactField::Mobile => record.mobile(),
    }
}

/// Finds the first contact field of `record` already held by another entry.
fn clashing_field(records: &HashMap<CustomerId, Stored>, record: &CustomerRecord) -> Option<ContactField> {
    [ContactField::Email, ContactField::Mobile]
        .into_iter()
        .find(|&field| {
            records.values().any(|s| {
                s.record.id() != record.id()
                    && contact_value(&s.record, field) == contact_value(record, field)
            })
        })
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn insert(&self, record: CustomerRecord) -> Result<Version> {
        let mut records = self.records.write().await;

        if let Some(field) = clashing_field(&records, &record) {
            return Err(StoreError::UniqueViolation { field });
        }

        let version = Version::first();
        records.insert(record.id(), Stored { record, version });
        Ok(version)
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Stored>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn contact_in_use(
        &self,
        field: ContactField,
        value: &str,
        exclude: Option<CustomerId>,
    ) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.values().any(|s| {
            Some(s.record.id()) != exclude && contact_value(&s.record, field) == value
        }))
    }

    async fn update(&self, record: CustomerRecord, expected: Version) -> Result<Version> {
        let mut records = self.records.write().await;
        let customer_id = record.id();

        let actual = records
            .get(&customer_id)
            .map(|s| s.version)
            .ok_or(StoreError::NotFound(customer_id))?;
        if actual != expected {
            return Err(StoreError::VersionConflict {
                customer_id,
                expected,
                actual,
            });
        }

        if let Some(field) = clashing_field(&records, &record) {
            return Err(StoreError::UniqueViolation { field });
        }

        let version = actual.next();
        records.insert(customer_id, Stored { record, version });
        Ok(version)
    }

    async fn delete(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        Ok(self.records.write().await.remove(&id).map(|s| s.record))
    }

    async fn query(&self, query: &CustomerQuery) -> Result<QueryResult> {
        let records = self.records.read().await;
        let mut matches: Vec<&CustomerRecord> = records
            .values()
            .map(|s| &s.record)
            .filter(|r| query.matches(r))
            .collect();
        let total = matches.len();

        matches.sort_by(|a, b| query.compare(a, b));

        let window = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(QueryResult {
            records: window,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::Actor;
    use domain::{AddressDraft, NewCustomer};

    use super::*;
    use crate::{CustomerStoreExt, SortDirection, SortField};

    fn record(first: &str, email: &str, mobile: &str) -> CustomerRecord {
        let input = NewCustomer::new(first, "Tester", email, mobile, "Male", "pic.jpg");
        CustomerRecord::register(input, &Actor::system(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = InMemoryCustomerStore::new();
        let r = record("Asha", "a@x.com", "9876543210");
        let id = r.id();

        let version = store.insert(r.clone()).await.unwrap();
        assert_eq!(version, Version::first());

        let stored = store.get(id).await.unwrap();
        assert_eq!(stored.record, r);
        assert_eq!(stored.version, Version::first());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email_and_mobile() {
        let store = InMemoryCustomerStore::new();
        store.insert(record("Asha", "a@x.com", "9876543210")).await.unwrap();

        let same_email = store.insert(record("Bela", "a@x.com", "9000000000")).await;
        assert!(matches!(
            same_email,
            Err(StoreError::UniqueViolation {
                field: ContactField::Email
            })
        ));

        let same_mobile = store.insert(record("Bela", "b@x.com", "9876543210")).await;
        assert!(matches!(
            same_mobile,
            Err(StoreError::UniqueViolation {
                field: ContactField::Mobile
            })
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = InMemoryCustomerStore::new();
        let mut r = record("Asha", "a@x.com", "9876543210");
        store.insert(r.clone()).await.unwrap();

        r.add_address(
            AddressDraft::new("x", "Pune", "MH", "411001"),
            &Actor::system(),
            Utc::now(),
        )
        .unwrap();
        let v2 = store.update(r.clone(), Version::first()).await.unwrap();
        assert_eq!(v2, Version::new(2));

        let stale = store.update(r, Version::first()).await;
        assert!(matches!(
            stale,
            Err(StoreError::VersionConflict { expected, actual, .. })
                if expected == Version::first() && actual == Version::new(2)
        ));
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = InMemoryCustomerStore::new();
        let r = record("Asha", "a@x.com", "9876543210");

        let result = store.update(r, Version::first()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn contact_in_use_can_exclude_self() {
        let store = InMemoryCustomerStore::new();
        let r = record("Asha", "a@x.com", "9876543210");
        let id = r.id();
        store.insert(r).await.unwrap();

        assert!(store.contact_in_use(ContactField::Email, "a@x.com", None).await.unwrap());
        assert!(!store.contact_in_use(ContactField::Email, "a@x.com", Some(id)).await.unwrap());
        assert!(!store.contact_in_use(ContactField::Mobile, "9000000000", None).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let store = InMemoryCustomerStore::new();
        let r = record("Asha", "a@x.com", "9876543210");
        let id = r.id();
        store.insert(r).await.unwrap();

        assert!(store.delete(id).await.unwrap().is_some());
        assert!(store.delete(id).await.unwrap().is_none());
        assert!(!store.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn query_windows_sorted_matches() {
        let store = InMemoryCustomerStore::new();
        for (i, name) in ["Dev", "Asha", "Chetan", "Bela"].iter().enumerate() {
            store
                .insert(record(name, &format!("{i}@x.com"), &format!("900000000{i}")))
                .await
                .unwrap();
        }

        let query = CustomerQuery::new()
            .sort(SortField::FirstName, SortDirection::Asc)
            .offset(1)
            .limit(2);
        let result = store.query(&query).await.unwrap();

        assert_eq!(result.total, 4);
        let names: Vec<_> = result.records.iter().map(|r| r.first_name()).collect();
        assert_eq!(names, vec!["Bela", "Chetan"]);
    }
}
