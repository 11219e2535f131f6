//! Security settings handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::auth::SecurityPolicy;
use crate::web::dto::{ApiResponse, SecuritySettingsRequest, SecuritySettingsResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AdminSession;

use super::AppState;

/// GET /api/settings/security - Current security policy.
#[utoipa::path(
    get,
    path = "/api/settings/security",
    tag = "Settings",
    responses(
        (status = 200, description = "Current security settings", body = SecuritySettingsResponse),
        (status = 401, description = "No live session")
    )
)]
pub async fn get_security_settings(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Json<ApiResponse<SecuritySettingsResponse>> {
    let policy = state.policy.get();

    Json(ApiResponse::new(SecuritySettingsResponse {
        session_timeout_minutes: policy.session_timeout_minutes,
        max_login_attempts: policy.max_login_attempts,
        lockout_duration_minutes: policy.lockout_duration_minutes,
    }))
}

/// PUT /api/settings/security - Replace the security policy.
///
/// Persists through the settings store, then swaps the shared policy and
/// pushes the new idle timeout into the session registry. The lockout guard
/// reads the policy per attempt, so no push is needed there. Takes effect
/// without a restart.
#[utoipa::path(
    put,
    path = "/api/settings/security",
    tag = "Settings",
    request_body = SecuritySettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SecuritySettingsResponse),
        (status = 401, description = "No live session"),
        (status = 422, description = "Values out of range")
    )
)]
pub async fn update_security_settings(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(req): Json<SecuritySettingsRequest>,
) -> Result<Json<ApiResponse<SecuritySettingsResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let policy = SecurityPolicy {
        session_timeout_minutes: req.session_timeout_minutes,
        max_login_attempts: req.max_login_attempts,
        lockout_duration_minutes: req.lockout_duration_minutes,
    };

    state.settings.save(&policy).map_err(|e| {
        tracing::error!(error = %e, "Failed to persist security settings");
        ApiError::internal("Failed to save settings")
    })?;

    state.policy.set(policy);
    state
        .registry
        .update_policy(policy.session_timeout_minutes);

    tracing::info!(
        session_timeout_minutes = policy.session_timeout_minutes,
        max_login_attempts = policy.max_login_attempts,
        lockout_duration_minutes = policy.lockout_duration_minutes,
        "Security settings updated"
    );

    Ok(Json(ApiResponse::new(SecuritySettingsResponse {
        session_timeout_minutes: policy.session_timeout_minutes,
        max_login_attempts: policy.max_login_attempts,
        lockout_duration_minutes: policy.lockout_duration_minutes,
    })))
}
