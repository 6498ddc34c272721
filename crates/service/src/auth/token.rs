use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use models::role::Role;
use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Bearer token claims: subject id, role, issued-at, expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Sign an HS256 token for the given identity.
pub fn sign(secret: &str, id: i32, role: Role, ttl_days: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        id,
        role,
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Verify signature and expiry; any failure collapses to `Unauthorized`.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::Unauthorized)
}
