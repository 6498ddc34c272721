use std::fmt;

use serde::{Deserialize, Serialize};

/// Access level carried in auth tokens and stored on the user row.
///
/// The canonical stored form is lowercase. Request payloads deserialize
/// strictly (`"admin"` / `"user"`); values read back from the store or a
/// token parse leniently, so rows written with a capitalized role by older
/// tooling still resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Case-insensitive parse; anything that is not `admin` is a plain user.
    pub fn parse(input: &str) -> Role {
        if input.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
