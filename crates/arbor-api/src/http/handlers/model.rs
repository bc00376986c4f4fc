//! Model catalog handler.
//!
//! GET /api/v1/models - The completion endpoint's model catalog. No auth
//! required; the catalog is public information.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use arbor_core::llm::provider::CompletionClient;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/models - List available model identifiers.
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let models = state.completions.models().to_vec();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(models, request_id, elapsed).with_link("self", "/api/v1/models");
    Ok(Json(resp))
}
