//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations      - List the caller's conversations
//! - POST   /api/v1/conversations      - Start a conversation (first exchange included)
//! - GET    /api/v1/conversations/{id} - Branch-annotated context of the current leaf
//! - DELETE /api/v1/conversations/{id} - Delete a conversation and its tree

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use arbor_core::chat::exchange;
use arbor_types::conversation::Conversation;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for starting a conversation.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub model_id: String,
    /// The first user prompt; also drives title generation.
    pub content: String,
}

/// Query parameters for reading a conversation.
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    /// Select the branch tip whose path passes through this message.
    #[serde(default)]
    pub message: Option<Uuid>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Ownership predicate: the conversation must belong to the caller.
pub(crate) async fn authorize_conversation(
    state: &AppState,
    user_id: &Uuid,
    conversation_id: &Uuid,
) -> Result<Conversation, AppError> {
    let conversation = state.chat_service.get_conversation(conversation_id).await?;
    if conversation.user_id != *user_id {
        return Err(AppError::Forbidden);
    }
    Ok(conversation)
}

/// GET /api/v1/conversations - List the caller's conversations.
pub async fn list_conversations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let conversations = state.chat_service.list_conversations(&user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload: Vec<serde_json::Value> = conversations
        .iter()
        .map(|c| serde_json::to_value(c).unwrap_or_default())
        .collect();

    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", "/api/v1/conversations");
    Ok(Json(resp))
}

/// POST /api/v1/conversations - Start a conversation with its first exchange.
pub async fn create_conversation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateConversationRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let opening = exchange::start_conversation(
        state.chat_service.as_ref(),
        state.completions.as_ref(),
        &user,
        &body.model_id,
        &body.content,
    )
    .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::json!({
        "conversation": opening.conversation,
        "user": opening.user,
        "assistant": opening.assistant,
    });

    let resp = ApiResponse::success(payload, request_id, elapsed).with_link(
        "self",
        &format!("/api/v1/conversations/{}", opening.conversation.id),
    );
    Ok(Json(resp))
}

/// GET /api/v1/conversations/{id} - Branch-annotated context of the current
/// leaf. `?message=<id>` selects the branch passing through that message.
pub async fn get_conversation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let conversation_id = parse_uuid(&id)?;
    authorize_conversation(&state, &user.id, &conversation_id).await?;

    let leaf = state
        .chat_service
        .current_leaf(&conversation_id, query.message.as_ref())
        .await?;
    let annotated = state.chat_service.branch_info(&leaf.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload: Vec<serde_json::Value> = annotated
        .iter()
        .map(|entry| serde_json::to_value(entry).unwrap_or_default())
        .collect();

    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{conversation_id}"));
    Ok(Json(resp))
}

/// DELETE /api/v1/conversations/{id} - Delete a conversation and its tree.
pub async fn delete_conversation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let conversation_id = parse_uuid(&id)?;
    authorize_conversation(&state, &user.id, &conversation_id).await?;
    state.chat_service.delete_conversation(&conversation_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"deleted": true}), request_id, elapsed);
    Ok(Json(resp))
}
