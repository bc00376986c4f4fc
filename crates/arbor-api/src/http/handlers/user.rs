//! User account HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/users      - Register a new account (no auth)
//! - POST   /api/v1/auth/login - Verify credentials, issue a bearer token (no auth)
//! - GET    /api/v1/users/me   - Current account
//! - PUT    /api/v1/users/me   - Update profile fields
//! - DELETE /api/v1/users/me   - Delete the account

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use arbor_core::user::service::UserUpdate;

use crate::http::error::AppError;
use crate::http::extractors::auth::{issue_token, CurrentUser};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Request body for profile updates; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
}

/// POST /api/v1/users - Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user = state
        .user_service
        .register(&body.username, &body.password)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::json!({"message": "created", "user": user});
    let resp = ApiResponse::success(payload, request_id, elapsed).with_link("self", "/api/v1/users/me");
    Ok(Json(resp))
}

/// POST /api/v1/auth/login - Verify credentials and issue a bearer token.
///
/// The plaintext token is returned exactly once; only its hash is stored.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user = state
        .user_service
        .authenticate(&body.username, &body.password)
        .await?;

    let token = issue_token(&state, &user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user,
    });
    let resp = ApiResponse::success(payload, request_id, elapsed);
    Ok(Json(resp))
}

/// GET /api/v1/users/me - The authenticated account.
pub async fn me(
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::to_value(&user).unwrap_or_default();
    let resp = ApiResponse::success(payload, request_id, elapsed).with_link("self", "/api/v1/users/me");
    Ok(Json(resp))
}

/// PUT /api/v1/users/me - Update profile fields.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let updated = state
        .user_service
        .update(
            &user.id,
            UserUpdate {
                username: body.username,
                password: body.password,
                personality: body.personality,
            },
        )
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::json!({"message": "updated", "user": updated});
    let resp = ApiResponse::success(payload, request_id, elapsed).with_link("self", "/api/v1/users/me");
    Ok(Json(resp))
}

/// DELETE /api/v1/users/me - Delete the account and everything it owns.
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.user_service.delete(&user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"deleted": true}), request_id, elapsed);
    Ok(Json(resp))
}
