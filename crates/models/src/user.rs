use chrono::Utc;
use sea_orm::{entity::prelude::*, Condition, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::role::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub photo_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored role, case-normalized.
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(ModelError::Validation("username must be 3-32 characters".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.chars().count();
    if !(1..=64).contains(&len) {
        return Err(ModelError::Validation("name must be 1-64 characters".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !ok {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.chars().count() < 8 {
        return Err(ModelError::Validation("password must be at least 8 characters".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    username: &str,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<Model, ModelError> {
    validate_username(username)?;
    validate_name(name)?;
    validate_email(email)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(username.to_string()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        role: Set(role.as_str().to_string()),
        photo_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::db)
}

/// Look up by username OR email, whichever identifiers are supplied.
pub async fn find_by_username_or_email(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<Option<Model>, ModelError> {
    if username.is_none() && email.is_none() {
        return Ok(None);
    }
    let mut cond = Condition::any();
    if let Some(u) = username {
        cond = cond.add(Column::Username.eq(u));
    }
    if let Some(e) = email {
        cond = cond.add(Column::Email.eq(e));
    }
    Entity::find().filter(cond).one(db).await.map_err(ModelError::db)
}

/// Match on every supplied identifier at once; used by the login lookup.
pub async fn find_matching_all(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<Option<Model>, ModelError> {
    if username.is_none() && email.is_none() {
        return Ok(None);
    }
    let mut cond = Condition::all();
    if let Some(u) = username {
        cond = cond.add(Column::Username.eq(u));
    }
    if let Some(e) = email {
        cond = cond.add(Column::Email.eq(e));
    }
    Entity::find().filter(cond).one(db).await.map_err(ModelError::db)
}
