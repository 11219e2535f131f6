//! Client address derivation.
//!
//! Lockout tracking keys on the client network address. Behind a reverse
//! proxy the socket address is the proxy, so forwarded headers take
//! precedence. Requests with no derivable address share the "unknown"
//! bucket; that is an accepted limitation.

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap, Request},
};
use std::net::SocketAddr;

/// Bucket for requests with no derivable address.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client address from headers and connection info.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    // X-Forwarded-For first (reverse proxy); take the first hop.
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    UNKNOWN_CLIENT.to_string()
}

/// Derive the client address from a full request.
pub fn client_ip_from_request(req: &Request<Body>) -> String {
    client_ip(req.headers(), req.extensions())
}

/// Extractor yielding the derived client address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

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
        let ip = client_ip(&parts.headers, &parts.extensions);
        Box::pin(async move { Ok(ClientIp(ip)) })
    }
}
