use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{ClientError, CreateClientRequest};
use crate::services::ClientService;

#[axum::debug_handler]
pub async fn register_client(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ClientService::new(&config);

    let client = service.create_client(&user.id, request, auth.token())
        .await
        .map_err(|e| match e {
            ClientError::DuplicateProfile => AppError::Conflict(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(client)))
}

#[axum::debug_handler]
pub async fn get_client_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ClientService::new(&config);

    let client = service.get_by_auth_user(&user.id, auth.token())
        .await
        .map_err(|e| match e {
            ClientError::NotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(client)))
}
