//! User account and login-token types for arbor.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// The password hash never leaves arbor-infra; this type is safe to
/// serialize into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Free-text persona folded into the system prompt of every new
    /// conversation this user starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            username,
            personality: None,
            created_at: Utc::now(),
        }
    }
}

/// A login token record.
///
/// Only the SHA-256 hash of the token is stored; the plaintext is shown to
/// the client once at login and never persisted.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Token lifetime: one week from issue.
    pub const TTL_DAYS: i64 = 7;

    pub fn issue(user_id: Uuid, token_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + Duration::days(Self::TTL_DAYS),
            last_used_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
