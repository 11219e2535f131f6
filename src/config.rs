//! Configuration module for Palisade.

use serde::Deserialize;
use std::path::Path;

use crate::{PalisadeError, Result};

/// Minimum session secret length in bytes (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Development mode. Relaxes the session secret requirement (an ephemeral
    /// secret is generated at startup) and drops the Secure cookie attribute.
    #[serde(default)]
    pub dev_mode: bool,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev_mode: false,
            cors_origins: vec![],
        }
    }
}

/// Administrator credential configuration.
///
/// A single administrator identity. Rotation means replacing these values and
/// restarting the process.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Administrator username.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Argon2id password hash in PHC format. Generate with
    /// `palisade hash-password`.
    #[serde(default)]
    pub password_hash: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password_hash: String::new(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens (must be at least 32 bytes).
    #[serde(default)]
    pub session_secret: String,
    /// Idle timeout for sessions in minutes.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u64,
    /// Failed login attempts allowed before a lockout.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Lockout duration in minutes.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_minutes: u64,
    /// Rate limit for the login endpoint (requests per minute per IP).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_session_timeout() -> u64 {
    60
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_lockout_duration() -> u64 {
    15
}

fn default_login_rate_limit() -> u32 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_timeout_minutes: default_session_timeout(),
            max_login_attempts: default_max_login_attempts(),
            lockout_duration_minutes: default_lockout_duration(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Runtime settings persistence configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsConfig {
    /// Path to the JSON file holding operator-tuned security settings.
    /// When unset, settings changes live in memory only.
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/palisade.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Administrator credentials.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Runtime settings persistence.
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PalisadeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| PalisadeError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PALISADE_SESSION_SECRET`: Override the session signing secret
    /// - `PALISADE_ADMIN_PASSWORD_HASH`: Override the admin password hash
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("PALISADE_SESSION_SECRET") {
            if !secret.is_empty() {
                self.auth.session_secret = secret;
            }
        }
        if let Ok(hash) = std::env::var("PALISADE_ADMIN_PASSWORD_HASH") {
            if !hash.is_empty() {
                self.admin.password_hash = hash;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Fails closed: a deployment without a password hash, or without a
    /// sufficiently long session secret outside of dev mode, must not start.
    pub fn validate(&self) -> Result<()> {
        if self.admin.username.is_empty() {
            return Err(PalisadeError::Config(
                "admin.username must not be empty".to_string(),
            ));
        }
        if self.admin.password_hash.is_empty() {
            return Err(PalisadeError::Config(
                "admin.password_hash is not set. Generate one with \
                 `palisade hash-password` and set it in config.toml or via \
                 PALISADE_ADMIN_PASSWORD_HASH."
                    .to_string(),
            ));
        }
        if self.auth.session_secret.is_empty() {
            if !self.server.dev_mode {
                return Err(PalisadeError::Config(
                    "auth.session_secret is not set. Set it in config.toml or via \
                     PALISADE_SESSION_SECRET, or enable server.dev_mode for local \
                     development."
                        .to_string(),
                ));
            }
        } else if self.auth.session_secret.len() < MIN_SECRET_LENGTH {
            return Err(PalisadeError::Config(format!(
                "auth.session_secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                self.auth.session_secret.len()
            )));
        }
        if self.auth.max_login_attempts == 0 {
            return Err(PalisadeError::Config(
                "auth.max_login_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
