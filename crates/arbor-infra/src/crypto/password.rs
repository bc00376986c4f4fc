//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$...`) with a per-password random salt,
//! so the same password hashes differently each time. Error types never
//! include the password or hash material.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use arbor_core::user::hasher::CredentialHasher;
use arbor_types::error::UserError;

/// Argon2id implementation of [`CredentialHasher`].
#[derive(Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, UserError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| UserError::HashingFailed)
    }

    fn verify(&self, hash: &str, password: &str) -> Result<bool, UserError> {
        let parsed = PasswordHash::new(hash).map_err(|_| UserError::HashingFailed)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "correct horse battery staple").unwrap());
        assert!(!hasher.verify(&hash, "wrong password").unwrap());
    }

    #[test]
    fn test_salting_makes_hashes_unique() {
        let hasher = Argon2CredentialHasher::new();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = Argon2CredentialHasher::new();
        assert!(matches!(
            hasher.verify("not a phc string", "password"),
            Err(UserError::HashingFailed)
        ));
    }
}
