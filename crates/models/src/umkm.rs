use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{category, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "umkm")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub location: String,
    pub description: String,
    pub category_id: i32,
    pub photo: Option<String>,
    pub user_id: i32,
    pub rating: f64,
    pub total_rating: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Category,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.chars().count();
    if !(1..=128).contains(&len) {
        return Err(ModelError::Validation("name must be 1-128 characters".into()));
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), ModelError> {
    let len = location.chars().count();
    if !(1..=128).contains(&len) {
        return Err(ModelError::Validation("location must be 1-128 characters".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.chars().count() > 1000 {
        return Err(ModelError::Validation("description must be at most 1000 characters".into()));
    }
    Ok(())
}

/// Insert a submission: inactive, zero aggregates, owned by the caller.
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    location: &str,
    description: &str,
    category_id: i32,
    photo: Option<String>,
    user_id: i32,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_location(location)?;
    validate_description(description)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        location: Set(location.to_string()),
        description: Set(description.to_string()),
        category_id: Set(category_id),
        photo: Set(photo),
        user_id: Set(user_id),
        rating: Set(0.0),
        total_rating: Set(0),
        is_active: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::db)
}
