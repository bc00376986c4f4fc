//! User account rules: registration, authentication, profile updates.

use std::sync::LazyLock;

use arbor_types::error::{RepositoryError, UserError};
use arbor_types::user::User;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use crate::user::hasher::CredentialHasher;
use crate::user::repository::UserRepository;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("username regex is valid"));

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Profile fields to change; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub personality: Option<String>,
}

/// Account rules over a [`UserRepository`] and a [`CredentialHasher`].
pub struct UserService<U: UserRepository, H: CredentialHasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository, H: CredentialHasher> UserService<U, H> {
    pub fn new(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// Register a new account.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, UserError> {
        validate_username(username)?;
        validate_password(password)?;

        if self.users.get_by_username(username).await?.is_some() {
            return Err(UserError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username.to_string());
        let password_hash = self.hasher.hash(password)?;
        self.users
            .create(&user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => UserError::UsernameTaken(username.to_string()),
                other => UserError::Storage(other),
            })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check a username/password pair and return the account on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(UserError::NotFound)?;
        let hash = self
            .users
            .password_hash(&user.id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !self.hasher.verify(&hash, password)? {
            return Err(UserError::WrongPassword);
        }
        Ok(user)
    }

    pub async fn get(&self, id: &Uuid) -> Result<User, UserError> {
        self.users.get(id).await?.ok_or(UserError::NotFound)
    }

    /// Apply a profile update, re-validating anything that changes.
    pub async fn update(&self, id: &Uuid, update: UserUpdate) -> Result<User, UserError> {
        let mut user = self.get(id).await?;

        if let Some(username) = update.username {
            if username != user.username {
                validate_username(&username)?;
                if let Some(existing) = self.users.get_by_username(&username).await? {
                    if existing.id != user.id {
                        return Err(UserError::UsernameTaken(username));
                    }
                }
                user.username = username;
            }
        }

        let password_hash = match update.password {
            Some(password) => {
                validate_password(&password)?;
                Some(self.hasher.hash(&password)?)
            }
            None => None,
        };

        if let Some(personality) = update.personality {
            user.personality = Some(personality);
        }

        self.users
            .update(&user, password_hash.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserError::NotFound,
                other => UserError::Storage(other),
            })?;

        Ok(user)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), UserError> {
        self.users.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => UserError::NotFound,
            other => UserError::Storage(other),
        })
    }
}

fn validate_username(username: &str) -> Result<(), UserError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(UserError::InvalidUsername(
            "usernames may only contain lowercase letters, digits, and underscores".to_string(),
        ))
    }
}

fn validate_password(password: &str) -> Result<(), UserError> {
    if password.len() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(UserError::InvalidPassword(format!(
            "passwords must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}
