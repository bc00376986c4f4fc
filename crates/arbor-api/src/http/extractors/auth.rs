//! Bearer-token authentication extractor.
//!
//! Tokens are opaque strings issued at login (`arb_` + 32 random bytes hex),
//! SHA-256 hashed and compared against the `auth_tokens` table. Extracting
//! [`CurrentUser`] validates the token, checks its expiry, and loads the
//! owning account.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use arbor_types::error::UserError;
use arbor_types::user::{AuthToken, User};

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated account. Extracting this validates the bearer token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts)?;
        let token_hash = hash_token(&token);

        let row = sqlx::query("SELECT id, user_id, expires_at FROM auth_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(&state.db_pool.reader)
            .await
            .map_err(|e| AppError::Internal(format!("database error: {e}")))?;

        let Some(row) = row else {
            return Err(AppError::Unauthorized(
                "Invalid token. Provide a valid token via 'Authorization: Bearer <token>'."
                    .to_string(),
            ));
        };

        let expires_at: String = row.get("expires_at");
        let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .map(|dt| chrono::Utc::now() >= dt)
            .unwrap_or(true);
        if expired {
            return Err(AppError::Unauthorized("Token expired".to_string()));
        }

        // Update last_used_at (best effort, don't fail the request)
        let id: String = row.get("id");
        let now = chrono::Utc::now().to_rfc3339();
        let _ = sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&id)
            .execute(&state.db_pool.writer)
            .await;

        let user_id: String = row.get("user_id");
        let user_id = user_id
            .parse::<Uuid>()
            .map_err(|e| AppError::Internal(format!("invalid user_id on token: {e}")))?;

        let user = state.user_service.get(&user_id).await.map_err(|e| match e {
            UserError::NotFound => AppError::Unauthorized("Token owner no longer exists".to_string()),
            other => AppError::User(other),
        })?;

        Ok(CurrentUser(user))
    }
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(AppError::Unauthorized(
            "Missing token. Provide via 'Authorization: Bearer <token>'.".to_string(),
        ));
    };

    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Ok(token.trim().to_string()),
        None => Err(AppError::Unauthorized(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}

/// Compute the SHA-256 hash of a token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Issue a fresh login token for a user and store its hash.
///
/// Returns the plaintext token (shown to the client once).
pub async fn issue_token(state: &AppState, user_id: &Uuid) -> Result<String, AppError> {
    let mut token_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut token_bytes);
    let plaintext = format!(
        "arb_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let token = AuthToken::issue(*user_id, hash_token(&plaintext));

    sqlx::query(
        r#"INSERT INTO auth_tokens (id, user_id, token_hash, created_at, expires_at, last_used_at)
           VALUES (?, ?, ?, ?, ?, NULL)"#,
    )
    .bind(token.id.to_string())
    .bind(token.user_id.to_string())
    .bind(&token.token_hash)
    .bind(token.created_at.to_rfc3339())
    .bind(token.expires_at.to_rfc3339())
    .execute(&state.db_pool.writer)
    .await
    .map_err(|e| AppError::Internal(format!("database error: {e}")))?;

    Ok(plaintext)
}
