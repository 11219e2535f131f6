//! Error types for Palisade.

use thiserror::Error;

/// Common error type for Palisade.
#[derive(Error, Debug)]
pub enum PalisadeError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    ///
    /// Raised at startup only. A missing session secret or password hash in a
    /// non-development deployment is fatal; the process refuses to start.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings store error.
    #[error("settings store error: {0}")]
    Settings(String),
}

/// Result type alias for Palisade operations.
pub type Result<T> = std::result::Result<T, PalisadeError>;
