//! Web API module for Palisade.
//!
//! The HTTP surface over the authentication subsystem: login/logout, the two
//! token verification endpoints, and the security settings API.

pub mod cookies;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
