use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use service::directory::{self, ListFilter, NewListing, SortKey};
use service::pagination::Pagination;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::{parse_payload, ApiError};

/// Raw query params; numbers arrive as strings and fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUmkmPayload {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub categories: i64,
    #[serde(default)]
    pub photo: Option<String>,
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::bad_request("Invalid id"))
}

fn int_or(raw: Option<&str>, fallback: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok()).unwrap_or(fallback)
}

#[utoipa::path(get, path = "/umkm", tag = "umkm", responses((status = 200, description = "OK")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let pagination = Pagination::clamped(
        int_or(query.page.as_deref(), 1),
        int_or(query.limit.as_deref(), 20),
    );
    let filter = ListFilter {
        q: query.q,
        location: query.location,
        category_id: query.category_id.as_deref().and_then(|s| s.parse::<i32>().ok()),
        sort: SortKey::parse(query.sort.as_deref()),
    };
    let paged = directory::list_active(&state.db, &filter, pagination).await?;
    Ok(Json(json!({
        "data": paged.rows,
        "pagination": { "page": pagination.page, "limit": pagination.limit, "total": paged.total },
    })))
}

#[utoipa::path(get, path = "/umkm/{id}", tag = "umkm", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let found = directory::detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;

    let mut body = serde_json::to_value(&found.umkm)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    body["category"] = json!(found.category);
    body["recent_comments"] = json!(found.recent_comments);
    Ok(Json(json!({ "data": body })))
}

#[utoipa::path(post, path = "/umkm", tag = "umkm", request_body = crate::openapi::CreateUmkmRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload: CreateUmkmPayload = parse_payload(body)?;
    if let Some(photo) = payload.photo.as_deref() {
        if !(photo.starts_with("http://") || photo.starts_with("https://")) {
            return Err(ApiError::bad_request("photo must be a URL"));
        }
    }
    let category_id = i32::try_from(payload.categories)
        .map_err(|_| ApiError::bad_request("categories must be a positive integer"))?;
    let listing = NewListing {
        name: payload.name,
        location: payload.location,
        description: payload.description.unwrap_or_default(),
        category_id,
        photo: payload.photo,
    };
    let created = directory::submit(&state.db, &listing, user.id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

#[utoipa::path(get, path = "/umkm/admin/pending", tag = "umkm", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn pending(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    let rows = directory::pending(&state.db).await?;
    Ok(Json(json!({ "data": rows })))
}

#[utoipa::path(post, path = "/umkm/{id}/activate", tag = "umkm", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn activate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let updated = directory::activate(&state.db, id).await?;
    Ok(Json(json!({ "data": updated })))
}
