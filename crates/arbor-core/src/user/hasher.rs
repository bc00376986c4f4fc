//! Credential hashing seam.
//!
//! The concrete Argon2id implementation lives in arbor-infra; keeping the
//! trait here lets account rules be tested with a cheap stand-in.

use arbor_types::error::UserError;

/// Hash and verify user passwords.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string.
    fn hash(&self, password: &str) -> Result<String, UserError>;

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on a clean mismatch; errors are reserved for
    /// malformed hashes.
    fn verify(&self, hash: &str, password: &str) -> Result<bool, UserError>;
}
