//! Message HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/messages/{id}/reply    - Follow up a message with a new exchange
//! - GET  /api/v1/messages/{id}/children - Sibling continuations under a message

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use arbor_core::chat::exchange;
use arbor_types::message::Message;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::handlers::conversation::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a follow-up prompt.
#[derive(Debug, Deserialize)]
pub struct SendReplyRequest {
    pub content: String,
}

/// Ownership predicate: the message's conversation must belong to the caller.
async fn authorize_message(
    state: &AppState,
    user_id: &Uuid,
    message_id: &Uuid,
) -> Result<Message, AppError> {
    let message = state.chat_service.get_message(message_id).await?;
    let conversation = state
        .chat_service
        .get_conversation(&message.conversation_id)
        .await?;
    if conversation.user_id != *user_id {
        return Err(AppError::Forbidden);
    }
    Ok(message)
}

/// POST /api/v1/messages/{id}/reply - Append a user turn under the given
/// message and return it with the model's reply. Sending to the same parent
/// twice creates sibling branches.
pub async fn send_reply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<SendReplyRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let parent_id = parse_uuid(&id)?;
    authorize_message(&state, &user.id, &parent_id).await?;

    let exchange = exchange::send_prompt(
        state.chat_service.as_ref(),
        state.completions.as_ref(),
        &parent_id,
        &body.content,
    )
    .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = serde_json::json!({
        "user": exchange.user,
        "assistant": exchange.assistant,
    });

    let resp = ApiResponse::success(payload, request_id, elapsed).with_link(
        "conversation",
        &format!("/api/v1/conversations/{}", exchange.user.conversation_id),
    );
    Ok(Json(resp))
}

/// GET /api/v1/messages/{id}/children - Sibling continuations recorded under
/// a message, in creation order.
pub async fn get_children(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let message_id = parse_uuid(&id)?;
    authorize_message(&state, &user.id, &message_id).await?;

    let children = state.chat_service.children(&message_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let payload: Vec<serde_json::Value> = children
        .iter()
        .map(|child| serde_json::to_value(child).unwrap_or_default())
        .collect();

    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", &format!("/api/v1/messages/{message_id}/children"));
    Ok(Json(resp))
}
