//! Middleware for the Web API.

pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{session_auth, AdminSession, SessionAuthState};
pub use client_ip::{client_ip, ClientIp, UNKNOWN_CLIENT};
pub use cors::create_cors_layer;
pub use rate_limit::{login_rate_limit, RateLimitState};
pub use security::security_headers;
