use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, Environment};
use dotenvy::dotenv;
use service::rate_limit::WindowLimiter;
use service::storage::MediaStore;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::{AuthSettings, RateLimits, ServerState};
use crate::routes;

/// Initialize logging via shared common utils; production emits JSON.
fn init_logging(env: Environment) {
    if env.is_production() {
        init_logging_json();
    } else {
        init_logging_default();
    }
}

/// CORS from the configured origin list. With no list configured the
/// development default is wide open and production denies cross-origin use.
fn build_cors(cfg: &AppConfig) -> CorsLayer {
    if cfg.cors.allowed_origins.is_empty() {
        if cfg.environment.is_production() {
            return CorsLayer::new();
        }
        return CorsLayer::very_permissive();
    }
    let origins: Vec<HeaderValue> = cfg
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    init_logging(cfg.environment);

    common::env::ensure_env(&cfg.uploads.dir).await?;

    // DB connection
    let db = models::db::connect_with(&cfg.database).await?;

    // Media store behind the public uploads path
    let media = MediaStore::new(&cfg.uploads.dir, &cfg.uploads.public_base)
        .await
        .map_err(|e| anyhow::anyhow!("media store init failed: {e}"))?;

    let state = ServerState {
        db,
        auth: AuthSettings {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_days: cfg.auth.token_ttl_days,
        },
        media,
        limits: RateLimits {
            global: Arc::new(WindowLimiter::new(
                cfg.rate_limit.global_max,
                Duration::from_secs(cfg.rate_limit.global_window_secs),
            )),
            login: Arc::new(WindowLimiter::new(
                cfg.rate_limit.login_max,
                Duration::from_secs(cfg.rate_limit.login_window_secs),
            )),
        },
        max_upload_bytes: cfg.uploads.max_bytes,
    };

    // Build router
    let cors = build_cors(&cfg);
    let app = routes::build_router(cors, state);

    // Bind and serve; connect info feeds the per-client rate limiter
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting umkm directory api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
