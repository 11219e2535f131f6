//! Session authentication middleware and extractors.
//!
//! Two verification strengths, mirroring the two external surfaces: the
//! token signature check is stateless and cheap; the registry touch is
//! authoritative and revocable. Privileged handlers use [`AdminSession`],
//! which requires both.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::{SessionRegistry, TokenCodec};
use crate::web::cookies;
use crate::web::error::ApiError;

/// Shared verification state for the session extractors.
pub struct SessionAuthState {
    /// Token codec for signature checks.
    pub codec: TokenCodec,
    /// Session registry for authoritative checks.
    pub registry: Arc<SessionRegistry>,
}

impl SessionAuthState {
    /// Create the auth state.
    pub fn new(codec: TokenCodec, registry: Arc<SessionRegistry>) -> Self {
        Self { codec, registry }
    }
}

/// Extractor for an authoritative admin session.
///
/// Verifies the token signature, then confirms and refreshes the session in
/// the registry. A signature-valid token whose registry record is gone (or
/// idle-expired) is rejected: logout and expiry are enforced here even
/// though the token itself stays structurally valid.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Authenticated username.
    pub username: String,
    /// Session issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Last verified activity timestamp (this request).
    pub last_seen_at: DateTime<Utc>,
    /// The presented token.
    pub token: String,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::session_token(&jar);
        let auth_state = parts.extensions.get::<Arc<SessionAuthState>>().cloned();

        Box::pin(async move {
            let auth_state = auth_state
                .ok_or_else(|| ApiError::internal("Session auth state not configured"))?;

            let token = token.ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

            // Malformed and forged tokens fail here, indistinguishably.
            if !auth_state.codec.verify(&token) {
                tracing::debug!("Session token failed signature verification");
                return Err(ApiError::unauthorized("Not authenticated"));
            }

            if !auth_state.registry.touch(&token) {
                tracing::debug!("Session token not in registry or idle-expired");
                return Err(ApiError::unauthorized("Session expired"));
            }

            let record = auth_state
                .registry
                .get(&token)
                .ok_or_else(|| ApiError::unauthorized("Session expired"))?;

            Ok(AdminSession {
                username: record.username,
                issued_at: record.issued_at,
                last_seen_at: record.last_seen_at,
                token,
            })
        })
    }
}

/// Middleware function to inject session auth state into request extensions.
pub async fn session_auth(
    auth_state: Arc<SessionAuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}
