// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use client_cell::models::ClientError;
use client_cell::services::ClientService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BookReservationRequest, CancelReservationRequest, ReservationError};
use crate::services::{AvailabilityService, HistoryService, ReservationService};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub specialist_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ServiceAvailabilityQuery {
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
}

// ==============================================================================
// RESERVATION HANDLERS
// ==============================================================================

/// Identity resolution happens here, once per request; the workflow only
/// ever sees a resolved client id.
async fn resolve_client(
    config: &AppConfig,
    user: &User,
    token: &str,
) -> Result<i64, AppError> {
    let clients = ClientService::new(config);
    clients.resolve_client_id(&user.id, token).await.map_err(|e| match e {
        ClientError::NotFound => AppError::NotFound(e.to_string()),
        _ => AppError::Internal(e.to_string()),
    })
}

fn map_reservation_error(e: ReservationError) -> AppError {
    match e {
        ReservationError::SlotNotFound => {
            AppError::NotFound("No slot exists for that specialist, date and time".to_string())
        }
        ReservationError::SlotUnavailable => {
            AppError::Conflict("Slot is no longer available".to_string())
        }
        _ => AppError::Internal(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn book_reservation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookReservationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let client_id = resolve_client(&config, &user, token).await?;

    let service = ReservationService::new(&config);
    let reservation = service
        .create_reservation(client_id, request, token)
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}

#[axum::debug_handler]
pub async fn cancel_reservation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(reservation_id): Path<i64>,
    Json(request): Json<CancelReservationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    // The caller must at least be a known client, even though the cancel
    // path itself works off the reservation reference.
    resolve_client(&config, &user, token).await?;

    let service = ReservationService::new(&config);
    service
        .cancel_reservation(reservation_id, request, token)
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "success": true,
        "reservation_id": reservation_id,
        "status": "cancelled"
    })))
}

#[axum::debug_handler]
pub async fn list_my_reservations(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let client_id = resolve_client(&config, &user, token).await?;

    let service = ReservationService::new(&config);
    let reservations = service
        .list_active_reservations(client_id, token)
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "reservations": reservations,
        "total": reservations.len()
    })))
}

#[axum::debug_handler]
pub async fn most_recent_reservation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let client_id = resolve_client(&config, &user, token).await?;

    let service = ReservationService::new(&config);
    let reservation = service
        .most_recent_reservation(client_id, token)
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({ "reservation": reservation })))
}

#[axum::debug_handler]
pub async fn get_reservation_history(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let supabase = Arc::new(shared_database::supabase::SupabaseClient::new(&config));
    let history = HistoryService::new(supabase);

    let entries = history
        .list(reservation_id, auth.token())
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "reservation_id": reservation_id,
        "history": entries
    })))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let slots = service
        .slots_for_specialist(query.specialist_id, query.date, auth.token())
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_service_availability(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<ServiceAvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let slots = service
        .open_slots_for_service(query.specialist_id, query.service_id, query.date, auth.token())
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "slots": slots,
        "total": slots.len()
    })))
}
