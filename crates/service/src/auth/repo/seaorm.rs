use async_trait::async_trait;
use models::role::Role;
use models::user;
use sea_orm::DatabaseConnection;

use crate::auth::domain::{AuthUser, StoredUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_stored(m: user::Model) -> StoredUser {
    StoredUser {
        user: AuthUser {
            id: m.id,
            username: m.username.clone(),
            name: m.name.clone(),
            email: m.email.clone(),
            role: m.role(),
        },
        password_hash: m.password_hash,
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<StoredUser>, AuthError> {
        let res = user::find_by_username_or_email(&self.db, username, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_stored))
    }

    async fn find_for_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<StoredUser>, AuthError> {
        let res = user::find_matching_all(&self.db, username, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_stored))
    }

    async fn create_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<AuthUser, AuthError> {
        let created = user::create(&self.db, username, name, email, password_hash, role)
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
                models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
            })?;
        let role = created.role();
        Ok(AuthUser {
            id: created.id,
            username: created.username,
            name: created.name,
            email: created.email,
            role,
        })
    }
}
