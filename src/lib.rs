//! Palisade - Admin authentication and login throttling
//!
//! Verifies a single administrator identity, issues and checks signed
//! session tokens, keeps the authoritative record of live sessions, and
//! throttles repeated failed logins per client address.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod settings;
pub mod web;

pub use auth::{
    hash_password, verify_signature, AdminCredentials, AttemptOutcome, AuthError, AuthService,
    CredentialError, CredentialVerifier, IssuedSession, LockoutGuard, PolicyHandle,
    SecurityPolicy, SessionRecord, SessionRegistry, TokenCodec, TokenError,
};
pub use config::Config;
pub use error::{PalisadeError, Result};
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use web::{ApiError, WebServer};
