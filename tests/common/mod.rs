//! Shared helpers for Web API integration tests.

use axum_test::TestServer;
use std::sync::Arc;

use palisade::auth::{
    AdminCredentials, AuthService, LockoutGuard, PolicyHandle, SecurityPolicy, SessionRegistry,
    TokenCodec,
};
use palisade::settings::MemorySettingsStore;
use palisade::web::handlers::AppState;
use palisade::web::middleware::{RateLimitState, SessionAuthState};
use palisade::web::router::create_router;

/// The admin password every test server accepts.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// The admin username every test server accepts.
pub const TEST_USERNAME: &str = "admin";

/// A test server plus handles into its shared state.
pub struct TestContext {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

/// Default test policy: 60 minute timeout, 5 attempts, 15 minute lockout.
pub fn test_policy() -> SecurityPolicy {
    SecurityPolicy {
        session_timeout_minutes: 60,
        max_login_attempts: 5,
        lockout_duration_minutes: 15,
    }
}

/// Create a test server with cookie persistence enabled.
pub fn create_test_server() -> TestContext {
    create_test_server_with_policy(test_policy())
}

/// Create a test server with a specific starting policy.
pub fn create_test_server_with_policy(policy: SecurityPolicy) -> TestContext {
    let hash = palisade::hash_password(TEST_PASSWORD).expect("hash test password");
    let credentials = AdminCredentials::new(TEST_USERNAME, hash).expect("test credentials");
    let codec = TokenCodec::new("test-secret-key-for-testing-only").expect("test codec");

    let registry = Arc::new(SessionRegistry::new(policy.session_timeout_minutes));
    let lockouts = Arc::new(LockoutGuard::new());
    let policy = PolicyHandle::new(policy);

    let auth = AuthService::new(
        Arc::new(credentials),
        codec.clone(),
        registry.clone(),
        lockouts.clone(),
        policy.clone(),
    );

    let state = Arc::new(AppState {
        auth,
        registry: registry.clone(),
        lockouts,
        policy,
        settings: Arc::new(MemorySettingsStore::new()),
        secure_cookies: false,
    });

    let auth_state = Arc::new(SessionAuthState::new(codec, registry));
    // Generous request throttle so lockout tests exercise the guard, not this
    let rate_limit = Arc::new(RateLimitState::new(1000));

    let router = create_router(state.clone(), auth_state, rate_limit, &[]);

    let mut server = TestServer::new(router).expect("Failed to create test server");
    server.save_cookies();

    TestContext { server, state }
}
