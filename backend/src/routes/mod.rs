//! Route definitions for the Pharmacy Manager API

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes
        .nest("/inventory", inventory_routes(state.clone()))
        .nest("/payment", payment_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
}

/// Inventory routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/manage-batch", post(handlers::manage_batch))
        .route("/delete-batch/:batch_id", delete(handlers::delete_batch))
        .route("/timeline/:inventory_id", get(handlers::get_timeline))
        .route("/:inventory_id", get(handlers::get_inventory_item))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Payment routes (protected)
fn payment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_payments).post(handlers::create_payment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
