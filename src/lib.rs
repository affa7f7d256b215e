pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::models::{PgUserStore, UserLookup};
use crate::middleware::{authenticate_jwt, ensure_logged_in, AuthGate};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub gate: AuthGate,
    pub users: Arc<dyn UserLookup>,
}

impl AppState {
    /// Wire the gate and user store to `pool`, using the configured JWT secret
    pub fn new(pool: PgPool, config: &AppConfig) -> Result<Self, auth::JwtError> {
        let users: Arc<dyn UserLookup> = Arc::new(PgUserStore::new(pool.clone()));
        Self::with_users(pool, users, &config.security.jwt_secret)
    }

    pub fn with_users(
        pool: PgPool,
        users: Arc<dyn UserLookup>,
        jwt_secret: &str,
    ) -> Result<Self, auth::JwtError> {
        let gate = AuthGate::new(jwt_secret, users.clone())?;
        Ok(Self { pool, gate, users })
    }
}

/// Build the HTTP application
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let gate = state.gate.clone();
    let login = from_fn_with_state(gate.clone(), ensure_logged_in);

    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/companies",
            post(handlers::companies::create)
                .route_layer(login.clone())
                .get(handlers::companies::list),
        )
        .route(
            "/companies/:handle",
            patch(handlers::companies::update)
                .delete(handlers::companies::remove)
                .route_layer(login.clone())
                .get(handlers::companies::get),
        )
        .route(
            "/jobs",
            post(handlers::jobs::create)
                .route_layer(login.clone())
                .get(handlers::jobs::list),
        )
        .route(
            "/jobs/:id",
            patch(handlers::jobs::update)
                .delete(handlers::jobs::remove)
                .route_layer(login.clone())
                .get(handlers::jobs::get),
        )
        .route(
            "/users/:username",
            get(handlers::users::get).route_layer(login.clone()),
        );

    let mut router = routes
        .layer(from_fn_with_state(gate.clone(), authenticate_jwt))
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}
