//! HTTP API server for the order coordinator.
//!
//! Exposes order CRUD over REST, with structured logging (tracing) and
//! Prometheus metrics. Cache and publisher failures never change a
//! response body; they are counted in the `x-order-warnings` header.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use coordinator::{MessagePublisher, OrderCache, OrderCoordinator};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C, P>(state: Arc<AppState<S, C, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/users/{user_id}/orders",
            post(routes::orders::create::<S, C, P>).get(routes::orders::list::<S, C, P>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S, C, P>)
                .put(routes::orders::update::<S, C, P>)
                .delete(routes::orders::delete::<S, C, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps the collaborators in a coordinator and shared application state.
pub fn create_state<S, C, P>(store: S, cache: C, publisher: P) -> Arc<AppState<S, C, P>>
where
    S: OrderStore,
    C: OrderCache,
    P: MessagePublisher,
{
    Arc::new(AppState {
        coordinator: OrderCoordinator::new(store, cache, publisher),
    })
}
