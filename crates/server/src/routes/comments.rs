use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use service::comments;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::bad_request("Invalid umkm id"))
}

#[utoipa::path(get, path = "/umkm/{id}/comments", tag = "comments", responses((status = 200, description = "OK")))]
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let umkm_id = parse_id(&id)?;
    let rows = comments::list_for_umkm(&state.db, umkm_id).await?;
    Ok(Json(json!({ "data": rows })))
}

#[utoipa::path(post, path = "/umkm/{id}/comments", tag = "comments", request_body = crate::openapi::CreateCommentRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn create(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let umkm_id = parse_id(&id)?;

    let content = body.get("content").and_then(Value::as_str).unwrap_or("");
    let rating = body.get("rating").and_then(Value::as_f64);
    let (content, rating) = match (content, rating) {
        (c, Some(r)) if !c.is_empty() => (c, r),
        _ => return Err(ApiError::bad_request("content and rating are required")),
    };

    let created = comments::create(&state.db, user.id, umkm_id, content, rating).await?;
    let mut response = json!({ "data": created.comment });
    if !created.aggregate_applied {
        response["warning"] = Value::String("Failed to update Umkm rating".into());
    }
    Ok((StatusCode::CREATED, Json(response)))
}
