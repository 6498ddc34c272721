use axum::extract::{Path, State};
use axum::Json;
use models::role::Role;
use serde::Deserialize;
use serde_json::{json, Value};
use service::users;

use crate::auth::ServerState;
use crate::errors::{parse_payload, ApiError};

#[derive(Debug, Deserialize)]
pub struct UpdateRolePayload {
    pub role: Role,
}

#[utoipa::path(patch, path = "/admin/users/{id}/role", tag = "admin", request_body = crate::openapi::UpdateRoleRequest, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn update_role(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let user_id = id.parse::<i32>().map_err(|_| ApiError::bad_request("Invalid id"))?;
    let payload: UpdateRolePayload = parse_payload(body)?;

    let updated = users::update_role(&state.db, user_id, payload.role).await?;
    Ok(Json(json!({
        "data": {
            "id": updated.id,
            "username": updated.username,
            "email": updated.email,
            "role": updated.role,
        },
    })))
}
