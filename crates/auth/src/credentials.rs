//! The single admin credential.

use sha2::{Digest, Sha256};

/// The one admin principal. The username is fixed for the process
/// lifetime; the password digest can be rotated at runtime.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Hex-encoded SHA-256 digest of the password (unsalted — MVP
    /// posture, matching the seeded config value).
    pub password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Check a username/password pair against the stored digest.
    ///
    /// The digest comparison is plain string equality; timing-safety is
    /// out of scope for the single-tenant threat model.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && hash_password(password) == self.password_hash
    }
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
