//! Response DTOs for the Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Authenticated username.
    pub username: String,
    /// Session issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Idle timeout applied to the session, in minutes.
    pub session_timeout_minutes: u64,
}

/// Current session response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Authenticated username.
    pub username: String,
    /// Session issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Last verified activity timestamp.
    pub last_seen_at: DateTime<Utc>,
    /// Idle timeout applied to the session, in minutes.
    pub session_timeout_minutes: u64,
}

/// Security settings response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SecuritySettingsResponse {
    /// Idle timeout for sessions in minutes.
    pub session_timeout_minutes: u64,
    /// Failed login attempts allowed before a lockout.
    pub max_login_attempts: u32,
    /// Lockout duration in minutes.
    pub lockout_duration_minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::new(SecuritySettingsResponse {
            session_timeout_minutes: 60,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"max_login_attempts\":5"));
    }

    #[test]
    fn test_login_response_serialize() {
        let response = LoginResponse {
            username: "admin".to_string(),
            issued_at: Utc::now(),
            session_timeout_minutes: 60,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(json.contains("issued_at"));
    }
}
