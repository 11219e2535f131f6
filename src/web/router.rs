//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    get_security_settings, login, logout, session_info, update_security_settings, verify, AppState,
};
use super::middleware::{
    create_cors_layer, login_rate_limit, security_headers, session_auth, RateLimitState,
    SessionAuthState,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::auth::login,
        crate::web::handlers::auth::logout,
        crate::web::handlers::auth::verify,
        crate::web::handlers::auth::session_info,
        crate::web::handlers::settings::get_security_settings,
        crate::web::handlers::settings::update_security_settings,
    ),
    components(schemas(
        crate::web::dto::LoginRequest,
        crate::web::dto::LoginResponse,
        crate::web::dto::SessionResponse,
        crate::web::dto::SecuritySettingsRequest,
        crate::web::dto::SecuritySettingsResponse,
    )),
    tags(
        (name = "Auth", description = "Administrator login, logout, and session checks"),
        (name = "Settings", description = "Operator-tunable security settings")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    auth_state: Arc<SessionAuthState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // Login gets its own request throttle in front of the lockout guard
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            login_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .merge(login_routes)
        .route("/logout", post(logout))
        .route("/verify", get(verify))
        .route("/session", get(session_info));

    let settings_routes = Router::new().route(
        "/security",
        get(get_security_settings).put(update_security_settings),
    );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/settings", settings_routes);

    // Clone auth_state for the middleware closure
    let auth_state_for_middleware = auth_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = auth_state_for_middleware.clone();
                    session_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
