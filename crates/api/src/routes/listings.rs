//! Listing, search and named view endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use customer_store::CustomerStore;
use query::{ListParams, LocationParams, NamedView, Page};

use crate::AppState;
use crate::error::{ApiError, OperationError};
use crate::response::{CustomerResponse, Envelope, customers, success};

type PageResult = Result<Envelope<Page<CustomerResponse>>, OperationError>;
type ListResult = Result<Envelope<Vec<CustomerResponse>>, OperationError>;

/// GET /user/details: filtered, sorted, paginated listing.
#[tracing::instrument(name = "get_users", skip(state))]
pub async fn details<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> PageResult {
    const OPERATION: &str = "get_users";
    let page = state
        .queries
        .list(&params)
        .await
        .map_err(|e| ApiError::from(e).during(OPERATION))?;
    Ok(success(
        OPERATION,
        "Users retrieved successfully",
        page.map(CustomerResponse::from),
    ))
}

/// GET /user/clear-filters
#[tracing::instrument(name = "clear_filters", skip(state))]
pub async fn clear_filters<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> PageResult {
    const OPERATION: &str = "clear_filters";
    let page = state
        .queries
        .clear_filters(&params)
        .await
        .map_err(|e| ApiError::from(e).during(OPERATION))?;
    Ok(success(
        OPERATION,
        "All users retrieved successfully",
        page.map(CustomerResponse::from),
    ))
}

/// GET /user/search/location
#[tracing::instrument(name = "search_by_location", skip(state))]
pub async fn search_by_location<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<LocationParams>,
) -> ListResult {
    const OPERATION: &str = "search_by_location";
    let records = state
        .queries
        .search_by_location(&params)
        .await
        .map_err(|e| ApiError::from(e).during(OPERATION))?;
    Ok(success(
        OPERATION,
        "Location search completed successfully",
        customers(records),
    ))
}

#[tracing::instrument(name = "get_multiple_address_customers", skip(state))]
pub async fn multiple_addresses<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> ListResult {
    const OPERATION: &str = "get_multiple_address_customers";
    let records = state
        .queries
        .named_view(NamedView::MultipleAddresses)
        .await
        .map_err(|e| ApiError::from(e).during(OPERATION))?;
    Ok(success(
        OPERATION,
        "Multiple address customers retrieved successfully",
        customers(records),
    ))
}

#[tracing::instrument(name = "get_single_address_customers", skip(state))]
pub async fn single_addresses<S: CustomerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> ListResult {
    const OPERATION: &str = "get_single_address_customers";
    let records = state
        .queries
        .named_view(NamedView::SingleAddresses)
        .await
        .map_err(|e| ApiError::from(e).during(OPERATION))?;
    Ok(success(
        OPERATION,
        "Single address customers retrieved successfully",
        customers(records),
    ))
}
