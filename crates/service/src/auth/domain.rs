use models::role::Role;
use serde::{Deserialize, Serialize};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input; at least one identifier must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Domain user (business view, never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A stored account as the repository sees it: the public user plus the hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: AuthUser,
    pub password_hash: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}
