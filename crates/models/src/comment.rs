use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{umkm, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub umkm_id: i32,
    pub content: String,
    pub rating: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Umkm,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Umkm => Entity::belongs_to(umkm::Entity)
                .from(Column::UmkmId)
                .to(umkm::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_content(content: &str) -> Result<(), ModelError> {
    if content.trim().is_empty() {
        return Err(ModelError::Validation("content must not be empty".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    umkm_id: i32,
    content: &str,
    rating: f64,
) -> Result<Model, ModelError> {
    validate_content(content)?;
    let am = ActiveModel {
        user_id: Set(user_id),
        umkm_id: Set(umkm_id),
        content: Set(content.to_string()),
        rating: Set(rating),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::db)
}
