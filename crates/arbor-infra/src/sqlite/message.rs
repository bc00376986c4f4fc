//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `arbor-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for SELECTs,
//! writer for mutations.
//!
//! Timestamps are stored as fixed-width RFC3339 (microsecond precision) so
//! that lexicographic `ORDER BY created_at` equals chronological order; ids
//! (UUIDv7, time-sortable) break the tie for writes landing in the same
//! microsecond. Sibling rank in branch numbering rests on this ordering.

use arbor_core::chat::repository::MessageRepository;
use arbor_types::error::RepositoryError;
use arbor_types::message::{Message, MessageRole};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MessageRow {
    id: String,
    conversation_id: String,
    parent_id: Option<String>,
    role: String,
    content: String,
    reasoning: Option<String>,
    path: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            parent_id: row.try_get("parent_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            reasoning: row.try_get("reasoning")?,
            path: row.try_get("path")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let parent_id = self
            .parent_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid parent_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let path: Vec<Uuid> = serde_json::from_str(&self.path)
            .map_err(|e| RepositoryError::Query(format!("invalid path column: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Message {
            id,
            conversation_id,
            parent_id,
            role,
            content: self.content,
            reasoning: self.reasoning,
            path,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width encoding: every stamp has exactly six fractional digits, so
/// text comparison in SQLite matches chronological comparison.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn encode_path(path: &[Uuid]) -> Result<String, RepositoryError> {
    serde_json::to_string(path)
        .map_err(|e| RepositoryError::Query(format!("cannot encode path: {e}")))
}

/// `?, ?, ...` fragment for an `IN` list of the given arity.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn rows_into_messages(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Message>, RepositoryError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in &rows {
        let message_row =
            MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        messages.push(message_row.into_message()?);
    }
    Ok(messages)
}

// ---------------------------------------------------------------------------
// MessageRepository implementation
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, conversation_id, parent_id, role, content, reasoning, path, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.parent_id.map(|id| id.to_string()))
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&message.reasoning)
        .bind(encode_path(&message.path)?)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let message_row =
                    MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(message_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Message>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM messages WHERE id IN ({}) ORDER BY created_at ASC, id ASC",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_messages(rows)
    }

    async fn children_of(&self, parent_ids: &[Uuid]) -> Result<Vec<Message>, RepositoryError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM messages WHERE parent_id IN ({}) ORDER BY created_at ASC, id ASC",
            placeholders(parent_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in parent_ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_messages(rows)
    }

    async fn latest_in_conversation(
        &self,
        conversation_id: &Uuid,
        containing: Option<&Uuid>,
    ) -> Result<Option<Message>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM messages WHERE conversation_id = ?");
        if containing.is_some() {
            // The path column is a JSON id array; json_each unnests it so we
            // can restrict to branches passing through the given message.
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(messages.path) WHERE json_each.value = ?)",
            );
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT 1");

        let mut query = sqlx::query(&sql).bind(conversation_id.to_string());
        if let Some(member) = containing {
            query = query.bind(member.to_string());
        }

        let row = query
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let message_row =
                    MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(message_row.into_message()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let on_the_second: DateTime<Utc> = "2026-01-02T03:04:05Z".parse().unwrap();
        let fractional: DateTime<Utc> = "2026-01-02T03:04:05.5Z".parse().unwrap();

        let a = format_datetime(&on_the_second);
        let b = format_datetime(&fractional);
        assert_eq!(a.len(), b.len());
        // Text order must match chronological order.
        assert!(a < b);
    }

    #[test]
    fn test_datetime_roundtrip() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now)).unwrap();
        // Microsecond precision is retained; sub-microsecond is truncated.
        assert!((now - parsed).num_microseconds().unwrap().abs() < 1);
    }

    #[test]
    fn test_path_json_roundtrip() {
        let path = vec![Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
        let encoded = encode_path(&path).unwrap();
        let decoded: Vec<Uuid> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(path, decoded);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
