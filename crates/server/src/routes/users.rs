use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};
use service::users;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;

/// Extension for the stored object: uploaded filename first, then the
/// mimetype subtype, then `jpg`.
fn extension_for(filename: Option<&str>, content_type: Option<&str>) -> String {
    filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .or_else(|| {
            content_type
                .and_then(|ct| ct.rsplit_once('/'))
                .map(|(_, subtype)| subtype.to_ascii_lowercase())
        })
        .unwrap_or_else(|| "jpg".to_string())
}

#[utoipa::path(post, path = "/users/me/photo", tag = "users", responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn upload_photo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            file = Some((filename, content_type, bytes));
            break;
        }
    }
    let Some((filename, content_type, bytes)) = file else {
        return Err(ApiError::bad_request("file is required"));
    };
    // rejected before anything reaches storage
    if bytes.len() > state.max_upload_bytes {
        return Err(ApiError::bad_request("file exceeds the 5MB limit"));
    }

    let ext = extension_for(filename.as_deref(), content_type.as_deref());
    let key = format!("user-{}/{}.{}", user.id, Utc::now().timestamp_millis(), ext);
    let url = state.media.put(&key, &bytes).await?;
    users::set_photo_url(&state.db, user.id, &url).await?;
    Ok(Json(json!({ "url": url })))
}
