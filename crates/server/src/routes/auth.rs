use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

use crate::auth::ServerState;
use crate::errors::{parse_payload, ApiError};

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: state.db.clone() }),
        AuthConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            token_ttl_days: state.auth.token_ttl_days,
        },
    )
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input: RegisterInput = parse_payload(body)?;
    let user = auth_service(&state).register(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": user }))))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized"), (status = 429, description = "Too Many Requests")))]
pub async fn login(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let input: LoginInput = parse_payload(body)?;
    let session = auth_service(&state).login(input).await?;
    Ok(Json(json!({
        "token": session.token,
        "user": {
            "id": session.user.id,
            "username": session.user.username,
            "email": session.user.email,
            "role": session.user.role,
        },
    })))
}
