//! Load, mutate and store with optimistic concurrency.

use customer_store::{CustomerId, CustomerStore, CustomerStoreExt, StoreError, Stored, Version};
use domain::{CustomerRecord, DomainError};

use crate::error::ServiceError;

/// Attempts made before a contended write is given up.
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<T> {
    /// The record as stored.
    pub record: CustomerRecord,

    /// Whatever the command returned.
    pub output: T,

    pub new_version: Version,
}

/// Runs commands against single customer records.
///
/// The handler:
/// 1. Loads the record and its version
/// 2. Applies the command to a copy
/// 3. Stores the copy only if the version is unchanged
/// 4. On a version conflict, starts over from a fresh load
pub struct CommandHandler<S: CustomerStore> {
    store: S,
}

impl<S: CustomerStore> CommandHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a record, failing with `CustomerNotFound` if it does not exist.
    pub async fn load(&self, id: CustomerId) -> Result<Stored, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Applies `command_fn` to the current record and stores the result.
    ///
    /// The command may run more than once when concurrent writers race, so
    /// it must only touch the record it is given. A command error aborts
    /// without writing anything.
    pub async fn execute<T, F>(
        &self,
        id: CustomerId,
        mut command_fn: F,
    ) -> Result<CommandResult<T>, ServiceError>
    where
        F: FnMut(&mut CustomerRecord) -> Result<T, DomainError> + Send,
        T: Send,
    {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let Stored {
                mut record,
                version,
            } = self.load(id).await?;

            let output = command_fn(&mut record)?;

            match self.store.update(record.clone(), version).await {
                Ok(new_version) => {
                    return Ok(CommandResult {
                        record,
                        output,
                        new_version,
                    });
                }
                Err(StoreError::VersionConflict { actual, .. }) => {
                    metrics::counter!("customer_cas_retries_total").increment(1);
                    tracing::debug!(customer_id = %id, attempt, %version, %actual, "retrying after version conflict");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(customer_id = %id, "giving up after repeated version conflicts");
        Err(ServiceError::Contention(id))
    }
}
