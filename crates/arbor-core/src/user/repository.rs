//! UserRepository trait definition.
//!
//! Persistence port for user accounts. Implementations live in arbor-infra
//! (`SqliteUserRepository`). Uses native async fn in traits (RPITIT).

use arbor_types::error::RepositoryError;
use arbor_types::user::User;
use uuid::Uuid;

/// Repository trait for user account persistence.
pub trait UserRepository: Send + Sync {
    /// Insert a user with their password hash. Fails with `Conflict` when
    /// the username is taken.
    fn create(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// The stored password hash for a user.
    fn password_hash(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Update profile fields; `password_hash` replaces the stored hash when
    /// given.
    fn update(
        &self,
        user: &User,
        password_hash: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a user and, via cascade, their tokens and conversations.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
