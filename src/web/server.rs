//! Web server for Palisade.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rand_core::{OsRng, RngCore};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::{debug, info, warn};

use crate::auth::{
    AdminCredentials, AuthService, LockoutGuard, PolicyHandle, SecurityPolicy, SessionRegistry,
    TokenCodec,
};
use crate::config::Config;
use crate::settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
use crate::{PalisadeError, Result};

use super::handlers::AppState;
use super::middleware::{RateLimitState, SessionAuthState};
use super::router::{create_health_router, create_router, create_swagger_router};

/// Interval between session/lockout cleanup sweeps.
const CLEANUP_INTERVAL_SECS: u64 = 300;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Session verification state.
    auth_state: Arc<SessionAuthState>,
    /// Login request throttle.
    rate_limit: Arc<RateLimitState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Assemble the server from validated configuration.
    ///
    /// Call [`Config::validate`] first; this constructor still fails closed
    /// on credential and secret faults, but with less helpful messages.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| PalisadeError::Config(format!("invalid server address: {e}")))?;

        let credentials =
            AdminCredentials::new(&config.admin.username, &config.admin.password_hash)
                .map_err(|e| PalisadeError::Config(e.to_string()))?;

        let secret = if config.auth.session_secret.is_empty() && config.server.dev_mode {
            warn!("No session secret configured; using an ephemeral dev-mode secret. Sessions will not survive a restart.");
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            hex::encode(bytes)
        } else {
            config.auth.session_secret.clone()
        };
        let codec =
            TokenCodec::new(secret.as_bytes()).map_err(|e| PalisadeError::Config(e.to_string()))?;

        let settings: Arc<dyn SettingsStore> = match &config.settings.path {
            Some(path) => Arc::new(FileSettingsStore::new(path)),
            None => Arc::new(MemorySettingsStore::new()),
        };

        // Persisted operator settings win over the config file defaults
        let policy = match settings.load()? {
            Some(policy) => {
                info!("Loaded persisted security settings");
                policy
            }
            None => SecurityPolicy {
                session_timeout_minutes: config.auth.session_timeout_minutes,
                max_login_attempts: config.auth.max_login_attempts,
                lockout_duration_minutes: config.auth.lockout_duration_minutes,
            },
        };

        let policy = PolicyHandle::new(policy);
        let registry = Arc::new(SessionRegistry::new(policy.get().session_timeout_minutes));
        let lockouts = Arc::new(LockoutGuard::new());

        let auth = AuthService::new(
            Arc::new(credentials),
            codec.clone(),
            registry.clone(),
            lockouts.clone(),
            policy.clone(),
        );

        let app_state = Arc::new(AppState {
            auth,
            registry: registry.clone(),
            lockouts,
            policy,
            settings,
            secure_cookies: !config.server.dev_mode,
        });
        let auth_state = Arc::new(SessionAuthState::new(codec, registry));
        let rate_limit = Arc::new(RateLimitState::new(config.auth.login_rate_limit));

        Ok(Self {
            addr,
            app_state,
            auth_state,
            rate_limit,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the periodic cleanup task.
    ///
    /// Sweeps idle-expired sessions and stale lockout records so memory does
    /// not grow with abandoned clients.
    fn start_cleanup_task(app_state: Arc<AppState>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let sessions = app_state.registry.cleanup();
                let window = app_state.policy.get().lockout_duration_minutes;
                let lockouts = app_state.lockouts.cleanup(window);

                if sessions > 0 || lockouts > 0 {
                    debug!(sessions, lockouts, "Cleanup sweep finished");
                }
            }
        });
    }

    fn build_router(&self) -> axum::Router {
        create_router(
            self.app_state.clone(),
            self.auth_state.clone(),
            self.rate_limit.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        Self::start_cleanup_task(self.app_state.clone());
        self.rate_limit.clone().start_cleanup_task();

        info!("Web server listening on http://{}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        Self::start_cleanup_task(self.app_state.clone());
        self.rate_limit.clone().start_cleanup_task();

        info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
