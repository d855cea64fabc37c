// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn reservation_routes(state: Arc<AppConfig>) -> Router {
    // All reservation operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::book_reservation))
        .route("/", get(handlers::list_my_reservations))
        .route("/latest", get(handlers::most_recent_reservation))
        .route("/{reservation_id}/cancel", post(handlers::cancel_reservation))
        .route("/{reservation_id}/history", get(handlers::get_reservation_history))
        .route("/availability", get(handlers::get_availability))
        .route("/availability/by-service", get(handlers::get_service_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
