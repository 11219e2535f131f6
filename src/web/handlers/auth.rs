//! Authentication handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::auth::{
    AuthError, AuthService, LockoutGuard, PolicyHandle, SessionRegistry,
};
use crate::settings::SettingsStore;
use crate::web::cookies;
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, SessionResponse};
use crate::web::error::ApiError;
use crate::web::middleware::{AdminSession, ClientIp};

/// Application state shared across handlers.
pub struct AppState {
    /// Login/logout composition.
    pub auth: AuthService,
    /// Session registry (policy pushes, cleanup).
    pub registry: Arc<SessionRegistry>,
    /// Lockout guard (cleanup).
    pub lockouts: Arc<LockoutGuard>,
    /// Current security policy.
    pub policy: PolicyHandle,
    /// Settings persistence.
    pub settings: Arc<dyn SettingsStore>,
    /// Whether session cookies carry the Secure attribute.
    pub secure_cookies: bool,
}

/// POST /api/auth/login - Administrator login.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookies set", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Locked out or rate limited")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    // Password verification is deliberately slow; keep it off the async
    // scheduler threads so unrelated requests are not stalled behind it.
    let auth = state.auth.clone();
    let issued = tokio::task::spawn_blocking(move || {
        auth.login(&req.username, &req.password, &client_ip)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Login task panicked");
        ApiError::internal("Login failed")
    })?
    .map_err(|e| match e {
        AuthError::InvalidCredentials { remaining_attempts } => {
            ApiError::invalid_credentials(remaining_attempts)
        }
        AuthError::Locked { retry_after_secs } => ApiError::locked(retry_after_secs),
    })?;

    let jar = cookies::set_session_cookies(
        jar,
        &issued.token,
        issued.issued_at,
        issued.timeout_minutes,
        state.secure_cookies,
    );

    let response = LoginResponse {
        username: issued.username,
        issued_at: issued.issued_at,
        session_timeout_minutes: issued.timeout_minutes,
    };

    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - End the current session.
///
/// Idempotent: succeeds and clears cookies even when no session exists.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session ended, cookies cleared")
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    if let Some(token) = cookies::session_token(&jar) {
        state.auth.logout(&token);
    }

    (
        cookies::clear_session_cookies(jar),
        Json(ApiResponse::new(())),
    )
}

/// GET /api/auth/verify - Stateless token verification.
///
/// For a fronting routing layer: checks only the token signature, never the
/// registry. An invalid or absent cookie yields 401 with the cookies cleared.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 204, description = "Token signature valid"),
        (status = 401, description = "Missing, malformed, or forged token")
    )
)]
pub async fn verify(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let valid = cookies::session_token(&jar)
        .map(|token| state.auth.codec().verify(&token))
        .unwrap_or(false);

    if valid {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            cookies::clear_session_cookies(jar),
            ApiError::unauthorized("Not authenticated"),
        )
            .into_response()
    }
}

/// GET /api/auth/session - Authoritative session check.
///
/// Touches the registry: a revoked or idle-expired session is rejected even
/// when its token signature still verifies.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Session is live", body = SessionResponse),
        (status = 401, description = "No live session")
    )
)]
pub async fn session_info(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Json<ApiResponse<SessionResponse>> {
    let response = SessionResponse {
        username: session.username,
        issued_at: session.issued_at,
        last_seen_at: session.last_seen_at,
        session_timeout_minutes: state.policy.get().session_timeout_minutes,
    };

    Json(ApiResponse::new(response))
}
