//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use arbor_types::error::{ChatError, ExchangeError, LlmError, UserError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversation-tree errors.
    Chat(ChatError),
    /// User account errors.
    User(UserError),
    /// Outbound completion collaborator errors.
    Llm(LlmError),
    /// Ownership mismatch between the caller and the resource.
    Forbidden,
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Chat(e) => AppError::Chat(e),
            ExchangeError::Llm(e) => AppError::Llm(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(ChatError::MessageNotFound) => (
                StatusCode::NOT_FOUND,
                "MESSAGE_NOT_FOUND",
                "Message not found".to_string(),
            ),
            AppError::Chat(ChatError::ConversationNotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Chat(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::User(UserError::NotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::User(UserError::UsernameTaken(username)) => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                format!("Username '{username}' already exists"),
            ),
            AppError::User(UserError::InvalidUsername(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::User(UserError::InvalidPassword(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::User(UserError::WrongPassword) => (
                StatusCode::UNAUTHORIZED,
                "WRONG_PASSWORD",
                "Wrong password".to_string(),
            ),
            AppError::User(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_ERROR",
                e.to_string(),
            ),
            AppError::Llm(LlmError::ModelNotFound(model)) => (
                StatusCode::NOT_FOUND,
                "MODEL_NOT_FOUND",
                format!("Model '{model}' not found"),
            ),
            AppError::Llm(LlmError::EmptyCompletion) => (
                StatusCode::BAD_GATEWAY,
                "EMPTY_COMPLETION",
                "Provider returned an empty completion".to_string(),
            ),
            AppError::Llm(e @ LlmError::ModelMismatch { .. }) => {
                (StatusCode::BAD_GATEWAY, "MODEL_MISMATCH", e.to_string())
            }
            AppError::Llm(e) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You cannot access this message or conversation".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
