//! Customer service providing the mutation API.

use chrono::Utc;
use common::{Actor, AddressId, CustomerId};
use customer_store::{ContactField, CustomerStore};
use domain::{
    AddressDraft, AddressOutcome, AddressPatch, CustomerPatch, CustomerRecord, CustomerStatus,
    NewCustomer,
};

use crate::error::ServiceError;
use crate::handler::{CommandHandler, CommandResult};

fn record_mutation(operation: &'static str) {
    metrics::counter!("customer_mutations_total", "operation" => operation).increment(1);
}

fn record_conflict(err: &ServiceError) {
    if let ServiceError::Conflict { field, .. } = err {
        metrics::counter!("customer_mutation_conflicts_total").increment(1);
        tracing::warn!(%field, "contact already in use");
    }
}

/// Service for managing customer records and their addresses.
///
/// Each address operation is one atomic write of the owning record.
pub struct CustomerService<S: CustomerStore> {
    handler: CommandHandler<S>,
}

impl<S: CustomerStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S> {
        &self.handler
    }

    pub fn store(&self) -> &S {
        self.handler.store()
    }

    /// Fails with the conflict built by `conflict` if another record holds
    /// `value`. The store constraint remains the authority; this only picks
    /// the friendlier message.
    async fn ensure_available(
        &self,
        field: ContactField,
        value: &str,
        exclude: Option<CustomerId>,
        conflict: fn(ContactField) -> ServiceError,
    ) -> Result<(), ServiceError> {
        if self.store().contact_in_use(field, value, exclude).await? {
            let err = conflict(field);
            record_conflict(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Validates and stores a new customer.
    #[tracing::instrument(skip(self, input), fields(%actor))]
    pub async fn register(
        &self,
        input: NewCustomer,
        actor: &Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        let record = CustomerRecord::register(input, actor, Utc::now())?;

        self.ensure_available(ContactField::Email, record.email(), None, ServiceError::duplicate)
            .await?;
        self.ensure_available(ContactField::Mobile, record.mobile(), None, ServiceError::duplicate)
            .await?;

        if let Err(e) = self.store().insert(record.clone()).await {
            let err = ServiceError::from(e);
            record_conflict(&err);
            return Err(err);
        }

        record_mutation("register");
        tracing::info!(customer_id = %record.id(), addresses = record.addresses().len(), "customer registered");
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: CustomerId) -> Result<CustomerRecord, ServiceError> {
        Ok(self.handler.load(id).await?.record)
    }

    /// Overwrites the fields present in `patch`.
    #[tracing::instrument(skip(self, patch), fields(%actor))]
    pub async fn edit(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
        actor: &Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        let current = self.get(id).await?;

        if let Some(email) = patch.normalized_email()
            && email != current.email()
        {
            self.ensure_available(ContactField::Email, &email, Some(id), ServiceError::taken_by_other)
                .await?;
        }
        if let Some(mobile) = patch.normalized_mobile()
            && mobile != current.mobile()
        {
            self.ensure_available(ContactField::Mobile, &mobile, Some(id), ServiceError::taken_by_other)
                .await?;
        }

        let result = self
            .handler
            .execute(id, |record| record.apply_patch(patch.clone(), actor, Utc::now()))
            .await
            .map_err(|e| match e {
                ServiceError::Conflict { field, .. } => {
                    let err = ServiceError::taken_by_other(field);
                    record_conflict(&err);
                    err
                }
                other => other,
            })?;

        record_mutation("edit");
        Ok(result.record)
    }

    /// Sets the account status. `status` must be `Active` or `InActive`.
    #[tracing::instrument(skip(self), fields(%actor))]
    pub async fn change_status(
        &self,
        id: CustomerId,
        status: &str,
        actor: &Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        let status: CustomerStatus = status
            .trim()
            .parse()
            .map_err(|_| ServiceError::invalid_status())?;

        let result = self
            .handler
            .execute(id, |record| {
                record.change_status(status, actor, Utc::now());
                Ok(())
            })
            .await?;

        record_mutation("change_status");
        Ok(result.record)
    }

    /// Hard-deletes a record together with its addresses.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: CustomerId) -> Result<CustomerRecord, ServiceError> {
        let record = self
            .store()
            .delete(id)
            .await?
            .ok_or(ServiceError::CustomerNotFound(id))?;

        record_mutation("delete");
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(record)
    }

    #[tracing::instrument(skip(self, draft), fields(%actor))]
    pub async fn add_address(
        &self,
        id: CustomerId,
        draft: AddressDraft,
        actor: &Actor,
    ) -> Result<CommandResult<AddressOutcome>, ServiceError> {
        let result = self
            .handler
            .execute(id, |record| record.add_address(draft.clone(), actor, Utc::now()))
            .await?;

        record_mutation("add_address");
        warn_if_defaults_diverged(&result);
        Ok(result)
    }

    #[tracing::instrument(skip(self, patch), fields(%actor))]
    pub async fn update_address(
        &self,
        id: CustomerId,
        address_id: AddressId,
        patch: AddressPatch,
        actor: &Actor,
    ) -> Result<CommandResult<AddressOutcome>, ServiceError> {
        let result = self
            .handler
            .execute(id, |record| {
                record.update_address(address_id, patch.clone(), actor, Utc::now())
            })
            .await?;

        record_mutation("update_address");
        warn_if_defaults_diverged(&result);
        Ok(result)
    }

    /// Removes an address; the first remaining address becomes the default
    /// if the default was removed.
    #[tracing::instrument(skip(self), fields(%actor))]
    pub async fn delete_address(
        &self,
        id: CustomerId,
        address_id: AddressId,
        actor: &Actor,
    ) -> Result<CommandResult<AddressOutcome>, ServiceError> {
        let result = self
            .handler
            .execute(id, |record| record.remove_address(address_id, actor, Utc::now()))
            .await?;

        record_mutation("delete_address");
        Ok(result)
    }

    #[tracing::instrument(skip(self), fields(%actor))]
    pub async fn set_default_address(
        &self,
        id: CustomerId,
        address_id: AddressId,
        actor: &Actor,
    ) -> Result<CommandResult<AddressOutcome>, ServiceError> {
        let result = self
            .handler
            .execute(id, |record| {
                record.set_default_address(address_id, actor, Utc::now())
            })
            .await?;

        record_mutation("set_default_address");
        Ok(result)
    }
}

fn warn_if_defaults_diverged(result: &CommandResult<AddressOutcome>) {
    let addresses = result.record.addresses();
    if !result.output.default_state.is_guaranteed() && !addresses.has_single_default() {
        tracing::warn!(
            customer_id = %result.record.id(),
            defaults = addresses.default_count(),
            "address set no longer has exactly one default"
        );
    }
}
