//! Customer record endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::CustomerId;
use customer_store::CustomerStore;
use domain::{CustomerPatch, NewCustomer};
use serde::Deserialize;

use crate::AppState;
use crate::error::{ApiError, OperationError};
use crate::extract::{CustomerForm, Payload, RequestActor};
use crate::response::{CustomerResponse, Envelope, success};
use crate::routes::operation;
use crate::uploads::{ProfileUploads, UploadError};

type CustomerResult = Result<Envelope<CustomerResponse>, OperationError>;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub data: Option<String>,
}

pub(crate) fn parse_customer_id(raw: &str) -> Result<CustomerId, ApiError> {
    Ok(raw.parse::<CustomerId>()?)
}

/// Stores the uploaded picture, if any, and returns its name.
async fn store_picture(uploads: &ProfileUploads, form: &CustomerForm) -> Result<Option<String>, ApiError> {
    let Some(file) = form.picture.as_ref() else {
        return Ok(None);
    };
    match uploads.save(file).await {
        Ok(name) => Ok(Some(name)),
        Err(e @ UploadError::UnsupportedType) => Err(ApiError::BadRequest(e.to_string())),
        Err(e @ UploadError::Io(_)) => Err(ApiError::Internal(e.to_string())),
    }
}

/// POST /user/register
#[tracing::instrument(name = "create_customer", skip_all, fields(actor = %actor))]
pub async fn register<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    RequestActor(actor): RequestActor,
    form: CustomerForm,
) -> CustomerResult {
    const OPERATION: &str = "create_customer";
    operation(OPERATION, async {
        let picture = store_picture(&state.uploads, &form).await?;

        let registered = match form.into_input::<NewCustomer>(picture.clone()) {
            Ok(input) => state.customers.register(input, &actor).await.map_err(ApiError::from),
            Err(e) => Err(e),
        };

        match registered {
            Ok(record) => Ok(success(
                OPERATION,
                "Customer created successfully",
                CustomerResponse::from(record),
            )),
            Err(e) => {
                if let Some(name) = picture {
                    state.uploads.discard(&name).await;
                }
                Err(e)
            }
        }
    })
    .await
}

/// GET /user/{id}
#[tracing::instrument(name = "get_customer", skip(state))]
pub async fn get<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> CustomerResult {
    const OPERATION: &str = "get_customer";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let record = state.customers.get(id).await?;
        Ok::<_, ApiError>(success(
            OPERATION,
            "User details retrieved successfully",
            CustomerResponse::from(record),
        ))
    })
    .await
}

/// PUT /user/edit/{id}
#[tracing::instrument(name = "update_customer", skip_all, fields(%id, actor = %actor))]
pub async fn edit<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    RequestActor(actor): RequestActor,
    form: CustomerForm,
) -> CustomerResult {
    const OPERATION: &str = "update_customer";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let picture = store_picture(&state.uploads, &form).await?;

        let edited = match form.into_input::<CustomerPatch>(picture.clone()) {
            Ok(patch) => state.customers.edit(id, patch, &actor).await.map_err(ApiError::from),
            Err(e) => Err(e),
        };

        match edited {
            Ok(record) => Ok(success(
                OPERATION,
                "User updated successfully",
                CustomerResponse::from(record),
            )),
            Err(e) => {
                if let Some(name) = picture {
                    state.uploads.discard(&name).await;
                }
                Err(e)
            }
        }
    })
    .await
}

/// DELETE /user/delete/{id}
#[tracing::instrument(name = "delete_customer", skip(state))]
pub async fn delete<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> CustomerResult {
    const OPERATION: &str = "delete_customer";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let record = state.customers.delete(id).await?;
        Ok::<_, ApiError>(success(
            OPERATION,
            "User deleted successfully",
            CustomerResponse::from(record),
        ))
    })
    .await
}

/// PUT /user/status/{id} with body `{"data": "Active" | "InActive"}`
#[tracing::instrument(name = "update_user_status", skip_all, fields(%id, actor = %actor))]
pub async fn change_status<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    RequestActor(actor): RequestActor,
    Payload(body): Payload<StatusRequest>,
) -> CustomerResult {
    const OPERATION: &str = "update_user_status";
    operation(OPERATION, async {
        let id = parse_customer_id(&id)?;
        let status = body.data.unwrap_or_default();
        let record = state.customers.change_status(id, &status, &actor).await?;

        let message = format!("User status updated to {}", record.status().as_str());
        Ok::<_, ApiError>(success(OPERATION, message, CustomerResponse::from(record)))
    })
    .await
}
