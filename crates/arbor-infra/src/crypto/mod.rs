//! Cryptographic operations: Argon2id credential hashing.

pub mod password;
