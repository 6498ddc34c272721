use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.chars().count();
    if !(1..=64).contains(&len) {
        return Err(ModelError::Validation("name must be 1-64 characters".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, ModelError> {
    validate_name(name)?;
    let am = ActiveModel { name: Set(name.to_string()), ..Default::default() };
    am.insert(db).await.map_err(ModelError::db)
}

/// Exact-match lookup used by the duplicate pre-check.
pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(ModelError::db)
}
