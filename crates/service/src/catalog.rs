use models::category;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::info;

use crate::errors::ServiceError;

/// All categories ordered by name ascending; the list is small and unpaginated.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, ServiceError> {
    category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// Create a category after an exact-match duplicate pre-check.
///
/// The pre-check and the insert are two separate store calls; concurrent
/// creators can still race past the check.
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category::Model, ServiceError> {
    category::validate_name(name)?;
    if category::find_by_name(db, name).await?.is_some() {
        return Err(ServiceError::Conflict("Category already exists".into()));
    }
    let created = category::create(db, name).await?;
    info!(category_id = created.id, name = %created.name, "category_created");
    Ok(created)
}
