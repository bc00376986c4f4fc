//! SQLite user repository implementation.

use arbor_core::user::repository::UserRepository;
use arbor_types::error::RepositoryError;
use arbor_types::user::User;
use sqlx::Row;
use uuid::Uuid;

use super::message::{format_datetime, parse_datetime};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    username: String,
    personality: Option<String>,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            personality: row.try_get("personality")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(User {
            id,
            username: self.username,
            personality: self.personality,
            created_at,
        })
    }
}

fn map_insert_error(e: sqlx::Error, username: &str) -> RepositoryError {
    let text = e.to_string();
    if text.contains("UNIQUE constraint failed") {
        RepositoryError::Conflict(format!("username '{username}' already exists"))
    } else {
        RepositoryError::Query(text)
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO users (id, username, password_hash, personality, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.personality)
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_insert_error(e, &user.username))?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn password_hash(&self, user_id: &Uuid) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(row.map(|(hash,)| hash))
    }

    async fn update(
        &self,
        user: &User,
        password_hash: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = match password_hash {
            Some(hash) => sqlx::query(
                "UPDATE users SET username = ?, personality = ?, password_hash = ? WHERE id = ?",
            )
            .bind(&user.username)
            .bind(&user.personality)
            .bind(hash)
            .bind(user.id.to_string())
            .execute(&self.pool.writer)
            .await,
            None => sqlx::query("UPDATE users SET username = ?, personality = ? WHERE id = ?")
                .bind(&user.username)
                .bind(&user.personality)
                .bind(user.id.to_string())
                .execute(&self.pool.writer)
                .await,
        }
        .map_err(|e| map_insert_error(e, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
