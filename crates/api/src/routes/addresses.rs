//! Address endpoints. Each responds with the whole updated customer.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::AddressId;
use customer_store::CustomerStore;
use domain::{AddressDraft, AddressPatch};

use crate::AppState;
use crate::error::{ApiError, OperationError};
use crate::extract::{Payload, RequestActor};
use crate::response::{CustomerResponse, Envelope, success};
use crate::routes::customers::parse_customer_id;
use crate::routes::operation;

type CustomerResult = Result<Envelope<CustomerResponse>, OperationError>;

const VALIDATION_HEADLINE: &str = "Address validation failed";

fn parse_address_id(raw: &str) -> Result<AddressId, ApiError> {
    Ok(raw.parse::<AddressId>()?)
}

/// POST /user/{id}/address
#[tracing::instrument(name = "add_address", skip_all, fields(%id, actor = %actor))]
pub async fn add<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    RequestActor(actor): RequestActor,
    Payload(draft): Payload<AddressDraft>,
) -> CustomerResult {
    const OPERATION: &str = "add_address";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let result = state
            .customers
            .add_address(id, draft, &actor)
            .await
            .map_err(|e| ApiError::from(e).with_validation_message(VALIDATION_HEADLINE))?;

        Ok::<_, ApiError>(success(
            OPERATION,
            "Address added successfully",
            CustomerResponse::from(result.record),
        ))
    })
    .await
}

/// PUT /user/{id}/address/{address_id}
#[tracing::instrument(name = "update_address", skip_all, fields(%id, %address_id, actor = %actor))]
pub async fn update<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, address_id)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
    Payload(patch): Payload<AddressPatch>,
) -> CustomerResult {
    const OPERATION: &str = "update_address";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let address_id = parse_address_id(&address_id)?;
        let result = state
            .customers
            .update_address(id, address_id, patch, &actor)
            .await
            .map_err(|e| ApiError::from(e).with_validation_message(VALIDATION_HEADLINE))?;

        Ok::<_, ApiError>(success(
            OPERATION,
            "Address updated successfully",
            CustomerResponse::from(result.record),
        ))
    })
    .await
}

/// DELETE /user/{id}/address/{address_id}
#[tracing::instrument(name = "delete_address", skip_all, fields(%id, %address_id, actor = %actor))]
pub async fn delete<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, address_id)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
) -> CustomerResult {
    const OPERATION: &str = "delete_address";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let address_id = parse_address_id(&address_id)?;
        let result = state.customers.delete_address(id, address_id, &actor).await?;

        Ok::<_, ApiError>(success(
            OPERATION,
            "Address deleted successfully",
            CustomerResponse::from(result.record),
        ))
    })
    .await
}

/// PUT /user/{id}/address/{address_id}/default
#[tracing::instrument(name = "set_default_address", skip_all, fields(%id, %address_id, actor = %actor))]
pub async fn set_default<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, address_id)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
) -> CustomerResult {
    const OPERATION: &str = "set_default_address";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let address_id = parse_address_id(&address_id)?;
        let result = state
            .customers
            .set_default_address(id, address_id, &actor)
            .await?;

        Ok::<_, ApiError>(success(
            OPERATION,
            "Default address updated successfully",
            CustomerResponse::from(result.record),
        ))
    })
    .await
}
