//! Administrator credential verification for Palisade.
//!
//! Uses Argon2id for password hashing and verification.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Credential-related errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No password hash configured (configuration fault, not an auth decision).
    #[error("no administrator password hash is configured")]
    MissingHash,

    /// No username configured.
    #[error("no administrator username is configured")]
    MissingUsername,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Create the Argon2 hasher with the documented work factor.
///
/// Parameters (OWASP baseline for Argon2id):
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 thread
fn create_argon2() -> Argon2<'static> {
    let m_cost = 19456;
    let t_cost = 2;
    let p_cost = 1;

    let params = Params::new(m_cost, t_cost, p_cost, None).expect("valid Argon2 params");
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
/// Used by the `hash-password` CLI mode so operators can produce the value
/// for `admin.password_hash`.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = create_argon2();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Trait seam for credential verification.
///
/// The production implementation is [`AdminCredentials`]; tests inject
/// counting or always-failing verifiers to observe the login flow.
pub trait CredentialVerifier: Send + Sync {
    /// Check a username/password pair against the stored identity.
    ///
    /// Returns `false` on any mismatch. Never errors for wrong credentials.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// The single administrator identity, loaded once from configuration.
///
/// Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    /// Create the credential store.
    ///
    /// Fails fast when the username or password hash is missing; that is a
    /// configuration fault, not a security decision.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let username = username.into();
        let password_hash = password_hash.into();

        if username.is_empty() {
            return Err(CredentialError::MissingUsername);
        }
        if password_hash.is_empty() {
            return Err(CredentialError::MissingHash);
        }

        Ok(Self {
            username,
            password_hash,
        })
    }

    /// The configured administrator username.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl CredentialVerifier for AdminCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Compare the username in constant time, then always run the password
        // verification. The hash comparison itself is constant-time inside
        // argon2; running both legs unconditionally keeps the overall timing
        // independent of which field mismatched.
        let username_ok: bool = username
            .as_bytes()
            .ct_eq(self.username.as_bytes())
            .into();

        let password_ok = PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false);

        username_ok && password_ok
    }
}
