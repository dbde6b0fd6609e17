//! HTTP API server with observability for the customer registry.
//!
//! Provides REST endpoints for customer records, their addresses and the
//! customer listings, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod uploads;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use customer_store::CustomerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use mutations::CustomerService;
use query::QueryEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use error::InternalErrorDetail;
use response::Envelope;
use uploads::ProfileUploads;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CustomerStore> {
    pub customers: CustomerService<S>,
    pub queries: QueryEngine<S>,
    pub uploads: ProfileUploads,
}

/// Creates the application state over one store.
pub fn create_state<S: CustomerStore + Clone + 'static>(store: S, config: &Config) -> Arc<AppState<S>> {
    Arc::new(AppState {
        customers: CustomerService::new(store.clone()),
        queries: QueryEngine::new(store),
        uploads: ProfileUploads::new(&config.upload_dir),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CustomerStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    use routes::{addresses, customers, listings};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/user/register", post(customers::register::<S>))
        .route("/user/details", get(listings::details::<S>))
        .route("/user/clear-filters", get(listings::clear_filters::<S>))
        .route("/user/search/location", get(listings::search_by_location::<S>))
        .route("/user/multiple-addresses", get(listings::multiple_addresses::<S>))
        .route("/user/single-addresses", get(listings::single_addresses::<S>))
        .route("/user/{id}", get(customers::get::<S>))
        .route("/user/edit/{id}", put(customers::edit::<S>))
        .route("/user/delete/{id}", axum::routing::delete(customers::delete::<S>))
        .route("/user/status/{id}", put(customers::change_status::<S>))
        .route("/user/{id}/address", post(addresses::add::<S>))
        .route(
            "/user/{id}/address/{address_id}",
            put(addresses::update::<S>).delete(addresses::delete::<S>),
        )
        .route(
            "/user/{id}/address/{address_id}/default",
            put(addresses::set_default::<S>),
        )
        .with_state(state);

    let app = Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .merge(metrics_router)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    if config.is_development() {
        app.layer(axum::middleware::map_response(reveal_internal_errors))
    } else {
        app
    }
}

/// Adds the raw cause to 500 responses. Mounted in development only.
async fn reveal_internal_errors(response: Response) -> Response {
    match response.extensions().get::<InternalErrorDetail>().cloned() {
        Some(InternalErrorDetail(detail)) => {
            let mut body = Envelope::<()>::failure("Internal server error");
            body.error = Some(detail);
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
        None => response,
    }
}
