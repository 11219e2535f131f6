//! API handlers for the Web API.

pub mod auth;
pub mod settings;

pub use auth::*;
pub use settings::*;
