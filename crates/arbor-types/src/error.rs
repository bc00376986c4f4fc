use thiserror::Error;

/// Errors from conversation-tree operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message not found")]
    MessageNotFound,

    #[error("conversation not found")]
    ConversationNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from user account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("password hashing failed")]
    HashingFailed,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from the outbound completion collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("empty completion from provider")]
    EmptyCompletion,

    #[error("model mismatch: requested '{requested}', provider answered with '{answered}'")]
    ModelMismatch { requested: String, answered: String },

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from repository operations (used by trait definitions in arbor-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Combined error for orchestrated exchanges (tree mutation + LLM call).
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::MessageNotFound.to_string(), "message not found");
        assert_eq!(
            ChatError::ConversationNotFound.to_string(),
            "conversation not found"
        );
    }

    #[test]
    fn test_user_error_display() {
        let err = UserError::UsernameTaken("ada".to_string());
        assert_eq!(err.to_string(), "username 'ada' already exists");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::ModelMismatch {
            requested: "qwen/qwen3-32b".to_string(),
            answered: "openai/gpt-oss-20b".to_string(),
        };
        assert!(err.to_string().contains("qwen/qwen3-32b"));
        assert!(err.to_string().contains("openai/gpt-oss-20b"));
    }

    #[test]
    fn test_repository_error_wraps_into_chat_error() {
        let err: ChatError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: syntax error");
    }

    #[test]
    fn test_exchange_error_is_transparent() {
        let err: ExchangeError = ChatError::MessageNotFound.into();
        assert_eq!(err.to_string(), "message not found");
        let err: ExchangeError = LlmError::EmptyCompletion.into();
        assert_eq!(err.to_string(), "empty completion from provider");
    }
}
