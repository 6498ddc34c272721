use chrono::Utc;
use models::role::Role;
use models::user;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument};

use crate::errors::ServiceError;

/// Write the canonical lowercase role onto the target user and return the
/// updated row. A missing id is classed with other store failures.
#[instrument(skip(db))]
pub async fn update_role(
    db: &DatabaseConnection,
    user_id: i32,
    role: Role,
) -> Result<user::Model, ServiceError> {
    let found = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::Db(format!("user {user_id} not found")))?;
    let mut am: user::ActiveModel = found.into();
    am.role = Set(role.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    info!(user_id = updated.id, role = %role, "role_updated");
    Ok(updated)
}

/// Persist a freshly uploaded photo URL on the caller's profile.
#[instrument(skip(db, url))]
pub async fn set_photo_url(
    db: &DatabaseConnection,
    user_id: i32,
    url: &str,
) -> Result<user::Model, ServiceError> {
    let found = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::Db(format!("user {user_id} not found")))?;
    let mut am: user::ActiveModel = found.into();
    am.photo_url = Set(Some(url.to_string()));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    info!(user_id = updated.id, "photo_updated");
    Ok(updated)
}
