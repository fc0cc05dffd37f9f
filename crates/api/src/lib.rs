//! HTTP API server for the order service.
//!
//! Provides REST endpoints for order management and for adding items to
//! orders, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{OrderStore, ProductStore, UnitOfWork};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Everything the handlers need from a store.
pub trait AppStore: ProductStore + OrderStore + UnitOfWork + Clone + 'static {}

impl<S> AppStore for S where S: ProductStore + OrderStore + UnitOfWork + Clone + 'static {}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: AppStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route("/orders/search", get(routes::orders::search::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .put(routes::orders::update::<S>)
                .delete(routes::orders::delete::<S>),
        )
        .route("/orders/{id}/order", post(routes::orders::add_item::<S>))
        .route("/orders/{id}/items", get(routes::orders::items::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(config.base_url.as_deref()))
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
pub fn create_state<S: AppStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}

fn cors_layer(base_url: Option<&str>) -> CorsLayer {
    let origin = match base_url.and_then(|url| HeaderValue::from_str(url).ok()) {
        Some(origin) => AllowOrigin::exact(origin),
        None => {
            if base_url.is_some() {
                tracing::warn!(?base_url, "BASE_URL is not a valid origin, allowing any");
            }
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
