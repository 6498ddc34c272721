use async_trait::async_trait;
use models::role::Role;

use super::domain::{AuthUser, StoredUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Match on username OR email (registration duplicate pre-check).
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<StoredUser>, AuthError>;

    /// Match on every supplied identifier (login lookup).
    async fn find_for_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<StoredUser>, AuthError>;

    async fn create_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<StoredUser>>,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_by_username_or_email(
            &self,
            username: Option<&str>,
            email: Option<&str>,
        ) -> Result<Option<StoredUser>, AuthError> {
            if username.is_none() && email.is_none() {
                return Ok(None);
            }
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|s| {
                    username.is_some_and(|u| s.user.username == u)
                        || email.is_some_and(|e| s.user.email == e)
                })
                .cloned())
        }

        async fn find_for_login(
            &self,
            username: Option<&str>,
            email: Option<&str>,
        ) -> Result<Option<StoredUser>, AuthError> {
            if username.is_none() && email.is_none() {
                return Ok(None);
            }
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|s| {
                    username.map_or(true, |u| s.user.username == u)
                        && email.map_or(true, |e| s.user.email == e)
                })
                .cloned())
        }

        async fn create_user(
            &self,
            username: &str,
            name: &str,
            email: &str,
            password_hash: &str,
            role: Role,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|s| s.user.username == username || s.user.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: users.len() as i32 + 1,
                username: username.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role,
            };
            users.push(StoredUser { user: user.clone(), password_hash: password_hash.to_string() });
            Ok(user)
        }
    }
}
