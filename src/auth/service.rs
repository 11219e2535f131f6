//! Login and logout composition.
//!
//! Ties the lockout guard, credential store, token codec, and session
//! registry together in a fixed order so the throttling policy cannot be
//! bypassed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use super::credentials::CredentialVerifier;
use super::lockout::LockoutGuard;
use super::policy::PolicyHandle;
use super::session::SessionRegistry;
use super::token::{self, TokenCodec};

/// Login failures surfaced to callers.
///
/// Wrong username and wrong password are indistinguishable by design.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credentials did not match.
    #[error("invalid credentials")]
    InvalidCredentials {
        /// Attempts left before a lockout starts.
        remaining_attempts: u32,
    },

    /// The client identifier is locked out.
    #[error("locked out for {retry_after_secs} seconds")]
    Locked {
        /// Seconds until the lockout ends.
        retry_after_secs: u64,
    },
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The signed session token.
    pub token: String,
    /// Username the session belongs to.
    pub username: String,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Idle timeout in effect at issue time, in minutes.
    pub timeout_minutes: u64,
}

/// Authentication service composing the subsystem's components.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialVerifier>,
    codec: TokenCodec,
    registry: Arc<SessionRegistry>,
    lockouts: Arc<LockoutGuard>,
    policy: PolicyHandle,
}

impl AuthService {
    /// Create the service.
    pub fn new(
        credentials: Arc<dyn CredentialVerifier>,
        codec: TokenCodec,
        registry: Arc<SessionRegistry>,
        lockouts: Arc<LockoutGuard>,
        policy: PolicyHandle,
    ) -> Self {
        Self {
            credentials,
            codec,
            registry,
            lockouts,
            policy,
        }
    }

    /// Attempt a login from the given client identifier.
    ///
    /// Order matters: (1) reject locked identifiers before touching the
    /// credential store, (2) verify, (3) on failure record the attempt,
    /// (4) on success re-check the lockout before clearing it and issuing a
    /// session. The re-check closes the race where a concurrent request
    /// locked the identifier between steps 1 and 2.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        client_id: &str,
    ) -> Result<IssuedSession, AuthError> {
        if self.lockouts.is_locked(client_id) {
            let retry_after_secs = self.lockouts.remaining_lock_secs(client_id);
            warn!(
                client = %client_id,
                retry_after_secs,
                "Login attempt while locked out"
            );
            return Err(AuthError::Locked { retry_after_secs });
        }

        let policy = self.policy.get();

        if !self.credentials.verify(username, password) {
            let outcome = self.lockouts.record_failed_attempt(
                client_id,
                policy.max_login_attempts,
                policy.lockout_duration_minutes,
            );
            warn!(client = %client_id, "Login failed: invalid credentials");
            if outcome.locked {
                return Err(AuthError::Locked {
                    retry_after_secs: self.lockouts.remaining_lock_secs(client_id),
                });
            }
            return Err(AuthError::InvalidCredentials {
                remaining_attempts: outcome.remaining_attempts,
            });
        }

        if self.lockouts.is_locked(client_id) {
            let retry_after_secs = self.lockouts.remaining_lock_secs(client_id);
            warn!(
                client = %client_id,
                "Login raced a lockout; rejecting despite valid credentials"
            );
            return Err(AuthError::Locked { retry_after_secs });
        }

        self.lockouts.clear_lockout(client_id);

        let token = self.codec.issue();
        self.registry.create(username, &token);

        let session_id = token::session_id(&token).unwrap_or_default();
        let session_prefix = &session_id[..session_id.len().min(8)];
        info!(
            username = %username,
            client = %client_id,
            session = %session_prefix,
            "Login successful"
        );

        Ok(IssuedSession {
            token,
            username: username.to_string(),
            issued_at: Utc::now(),
            timeout_minutes: policy.session_timeout_minutes,
        })
    }

    /// End the session for the given token. Idempotent.
    pub fn logout(&self, token: &str) {
        self.registry.delete(token);
    }

    /// The token codec (for stateless verification surfaces).
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The session registry (for authoritative verification surfaces).
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}
