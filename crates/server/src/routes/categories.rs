use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use service::catalog;

use crate::auth::ServerState;
use crate::errors::{parse_payload, ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryPayload {
    pub name: String,
}

#[utoipa::path(get, path = "/categories", tag = "categories", responses((status = 200, description = "OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    let categories = catalog::list_categories(&state.db).await?;
    Ok(Json(json!({ "data": categories })))
}

#[utoipa::path(post, path = "/categories", tag = "categories", request_body = crate::openapi::CreateCategoryRequest, responses((status = 201, description = "Created"), (status = 409, description = "Conflict"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload: CreateCategoryPayload = parse_payload(body)?;
    let created = catalog::create_category(&state.db, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}
