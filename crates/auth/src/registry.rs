//! In-memory session registry.
//!
//! Sessions move `Created → Valid → Expired/Revoked`; there is no way
//! back to Valid. Expiry is detected lazily on `validate` (which evicts)
//! and proactively by the hourly sweep the gateway schedules.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::RngCore;

use crate::credentials::{hash_password, AdminCredentials};
use pb_domain::error::{Error, Result};

/// Fixed session lifetime.
pub const SESSION_TTL_HOURS: i64 = 24;

/// A live admin session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Process-wide registry of live admin sessions, keyed by token.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    credentials: RwLock<AdminCredentials>,
}

impl SessionRegistry {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            credentials: RwLock::new(credentials),
        }
    }

    /// Validate the admin credential pair and mint a new session.
    ///
    /// Returns the opaque bearer token on success.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !self.credentials.read().verify(username, password) {
            return Err(Error::InvalidCredentials);
        }

        let token = generate_token();
        let session = Session {
            token: token.clone(),
            created_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        };
        self.sessions.write().insert(token.clone(), session);
        tracing::info!(username = %username, "admin session created");
        Ok(token)
    }

    /// Whether `token` names a live session. An expired session is
    /// removed as a side effect (lazy eviction), so a second call for
    /// the same expired token will not find it.
    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        if token.is_empty() {
            return false;
        }
        let mut sessions = self.sessions.write();
        match sessions.get(token) {
            None => false,
            Some(session) if now > session.expires_at => {
                sessions.remove(token);
                tracing::debug!("expired session evicted on validate");
                false
            }
            Some(_) => true,
        }
    }

    /// Remove the session if present. Idempotent.
    pub fn logout(&self, token: &str) {
        if self.sessions.write().remove(token).is_some() {
            tracing::info!("admin session revoked");
        }
    }

    /// Replace the stored password digest. Live sessions stay valid: a
    /// changed password does not force re-login of current holders.
    pub fn change_password(&self, new_password: &str) {
        self.credentials.write().password_hash = hash_password(new_password);
        tracing::info!("admin password updated");
    }

    /// Evict every session past its expiry. Returns the eviction count.
    /// Scheduled hourly by the gateway to bound registry growth between
    /// requests.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| now <= session.expires_at);
        before - sessions.len()
    }

    /// Number of live (not yet swept) sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// 256 bits from the OS RNG, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(AdminCredentials::new("admin", hash_password("admin123")))
    }

    #[test]
    fn login_returns_256_bit_hex_token() {
        let reg = registry();
        let token = reg.login("admin", "admin123").unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let reg = registry();
        assert!(matches!(
            reg.login("admin", "nope"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            reg.login("root", "admin123"),
            Err(Error::InvalidCredentials)
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn validate_rejects_empty_and_unknown_tokens() {
        let reg = registry();
        assert!(!reg.validate(""));
        assert!(!reg.validate("deadbeef"));
    }

    #[test]
    fn expired_session_is_evicted_on_validate() {
        let reg = registry();
        let t0 = Utc::now();
        let token = reg.login_at("admin", "admin123", t0).unwrap();
        assert!(reg.validate_at(&token, t0));

        let after_expiry = t0 + Duration::hours(SESSION_TTL_HOURS) + Duration::seconds(1);
        assert!(!reg.validate_at(&token, after_expiry));
        // Eviction side effect: the session is gone, not just invalid.
        assert!(reg.is_empty());
    }

    #[test]
    fn session_valid_exactly_at_expiry_boundary() {
        let reg = registry();
        let t0 = Utc::now();
        let token = reg.login_at("admin", "admin123", t0).unwrap();
        // expires_at itself is still valid; only now > expires_at fails.
        assert!(reg.validate_at(&token, t0 + Duration::hours(SESSION_TTL_HOURS)));
    }

    #[test]
    fn logout_is_idempotent() {
        let reg = registry();
        let token = reg.login("admin", "admin123").unwrap();
        reg.logout(&token);
        assert!(!reg.validate(&token));
        reg.logout(&token);
        assert!(!reg.validate(&token));
    }

    #[test]
    fn change_password_keeps_live_sessions() {
        let reg = registry();
        let token = reg.login("admin", "admin123").unwrap();
        reg.change_password("hunter2");
        // Existing session survives the rotation.
        assert!(reg.validate(&token));
        // Old password no longer logs in; new one does.
        assert!(reg.login("admin", "admin123").is_err());
        assert!(reg.login("admin", "hunter2").is_ok());
    }

    #[test]
    fn sweep_evicts_only_expired_sessions() {
        let reg = registry();
        let t0 = Utc::now();
        let old = reg.login_at("admin", "admin123", t0).unwrap();
        let fresh = reg
            .login_at("admin", "admin123", t0 + Duration::hours(12))
            .unwrap();

        let sweep_time = t0 + Duration::hours(SESSION_TTL_HOURS) + Duration::seconds(1);
        assert_eq!(reg.sweep_expired_at(sweep_time), 1);
        assert!(!reg.validate_at(&old, sweep_time));
        assert!(reg.validate_at(&fresh, sweep_time));
    }
}
