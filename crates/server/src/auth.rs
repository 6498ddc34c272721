use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use models::role::Role;
use sea_orm::DatabaseConnection;
use service::auth::token;
use service::rate_limit::WindowLimiter;
use service::storage::MediaStore;
use tracing::warn;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Clone)]
pub struct RateLimits {
    pub global: Arc<WindowLimiter>,
    pub login: Arc<WindowLimiter>,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: AuthSettings,
    pub media: Arc<MediaStore>,
    pub limits: RateLimits,
    pub max_upload_bytes: usize,
}

/// Identity attached to the request by the bearer middleware.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub role: Role,
}

/// Middleware: verify `Authorization: Bearer <token>` and attach the caller
/// identity to request extensions.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = header.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing Authorization header"));
    }
    let claims = token::verify(&state.auth.jwt_secret, token).map_err(|_| {
        warn!(path = %req.uri().path(), "token validation failed");
        ApiError::unauthorized("Invalid or expired token")
    })?;
    req.extensions_mut().insert(CurrentUser { id: claims.id, role: claims.role });
    Ok(next.run(req).await)
}

/// Middleware: the attached identity must be an admin.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(req, next, Role::Admin).await
}

/// Middleware: the attached identity must be a plain user.
pub async fn require_user(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(req, next, Role::User).await
}

async fn require_role(req: Request, next: Next, role: Role) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        None => Err(ApiError::unauthorized("Unauthorized")),
        Some(user) if user.role != role => Err(ApiError::forbidden()),
        Some(_) => Ok(next.run(req).await),
    }
}

/// Rate-limit key for a request: first `X-Forwarded-For` entry when a proxy
/// is in front, otherwise the peer address.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware: process-wide request budget per client.
pub async fn limit_global(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.limits.global.check(&client_key(&req)) {
        return Err(ApiError::too_many_requests());
    }
    Ok(next.run(req).await)
}

/// Middleware: the stricter per-client budget on the login route.
pub async fn limit_login(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.limits.login.check(&client_key(&req)) {
        return Err(ApiError::too_many_requests());
    }
    Ok(next.run(req).await)
}
