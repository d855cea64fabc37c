use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::reservation_routes;
use catalog_cell::router::catalog_routes;
use client_cell::router::client_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking API is running!" }))
        .nest("/clients", client_routes(state.clone()))
        .nest("/catalog", catalog_routes(state.clone()))
        .nest("/reservations", reservation_routes(state.clone()))
}
