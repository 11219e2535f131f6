//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Administrator username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Security settings update request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SecuritySettingsRequest {
    /// Idle timeout for sessions in minutes.
    #[validate(range(min = 1, max = 1440, message = "must be between 1 and 1440 minutes"))]
    pub session_timeout_minutes: u64,
    /// Failed login attempts allowed before a lockout.
    #[validate(range(min = 1, max = 20, message = "must be between 1 and 20 attempts"))]
    pub max_login_attempts: u32,
    /// Lockout duration in minutes.
    #[validate(range(min = 1, max = 1440, message = "must be between 1 and 1440 minutes"))]
    pub lockout_duration_minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserialize() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"admin","password":"secret"}"#).unwrap();
        assert_eq!(req.username, "admin");
        assert_eq!(req.password, "secret");
    }

    #[test]
    fn test_settings_request_valid() {
        let req = SecuritySettingsRequest {
            session_timeout_minutes: 60,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_settings_request_rejects_zero_attempts() {
        let req = SecuritySettingsRequest {
            session_timeout_minutes: 60,
            max_login_attempts: 0,
            lockout_duration_minutes: 15,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_settings_request_rejects_huge_timeout() {
        let req = SecuritySettingsRequest {
            session_timeout_minutes: 100_000,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
        };
        assert!(req.validate().is_err());
    }
}
