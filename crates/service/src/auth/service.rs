use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use models::role::Role;
use models::user as user_model;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

fn check(result: Result<(), models::errors::ModelError>) -> Result<(), AuthError> {
    result.map_err(|e| AuthError::Validation(e.to_string()))
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password and the default role.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_days: 7 });
    /// let input = RegisterInput { username: "sari".into(), name: "Sari".into(), email: "sari@example.com".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.role, models::role::Role::User);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        check(user_model::validate_username(&input.username))?;
        check(user_model::validate_name(&input.name))?;
        check(user_model::validate_email(&input.email))?;
        check(user_model::validate_password(&input.password))?;

        if let Some(existing) = self
            .repo
            .find_by_username_or_email(Some(&input.username), Some(&input.email))
            .await?
        {
            debug!("user exists: {}", existing.user.username);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(&input.username, &input.name, &input.email, &hash, Role::User)
            .await?;
        info!(user_id = user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Authenticate by username or email and issue a bearer token.
    ///
    /// Unknown identifiers and wrong passwords collapse into the same
    /// `Unauthorized` error.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_days: 7 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "budi".into(), name: "Budi".into(), email: "budi@example.com".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: Some("budi".into()), email: None, password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "budi");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = ?input.username, email = ?input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.username.is_none() && input.email.is_none() {
            return Err(AuthError::Validation("username or email required".into()));
        }
        check(user_model::validate_password(&input.password))?;

        let stored = self
            .repo
            .find_for_login(input.username.as_deref(), input.email.as_deref())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&stored.password_hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::Unauthorized);
        }

        let user = stored.user;
        let token = token::sign(&self.cfg.jwt_secret, user.id, user.role, self.cfg.token_ttl_days)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn service() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_days: 7 },
        )
    }

    fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            name: "Test".into(),
            email: email.into(),
            password: "Passw0rd!".into(),
        }
    }

    #[tokio::test]
    async fn register_defaults_to_user_role() {
        let svc = service();
        let user = svc.register(register_input("alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username_or_email() {
        let svc = service();
        svc.register(register_input("alice", "alice@example.com")).await.unwrap();

        let dup_username = svc.register(register_input("alice", "other@example.com")).await;
        assert!(matches!(dup_username, Err(AuthError::Conflict)));

        let dup_email = svc.register(register_input("bob", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let svc = service();
        let mut short_username = register_input("ab", "a@example.com");
        short_username.username = "ab".into();
        assert!(matches!(svc.register(short_username).await, Err(AuthError::Validation(_))));

        let mut bad_email = register_input("carol", "nope");
        bad_email.email = "nope".into();
        assert!(matches!(svc.register(bad_email).await, Err(AuthError::Validation(_))));

        let mut short_password = register_input("dave", "dave@example.com");
        short_password.password = "short".into();
        assert!(matches!(svc.register(short_password).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_works_with_either_identifier() {
        let svc = service();
        svc.register(register_input("erin", "erin@example.com")).await.unwrap();

        let by_username = svc
            .login(LoginInput { username: Some("erin".into()), email: None, password: "Passw0rd!".into() })
            .await
            .unwrap();
        assert_eq!(by_username.user.username, "erin");

        let by_email = svc
            .login(LoginInput { username: None, email: Some("erin@example.com".into()), password: "Passw0rd!".into() })
            .await
            .unwrap();
        assert_eq!(by_email.user.id, by_username.user.id);

        // the embedded role survives the round trip
        let claims = token::verify("test-secret", &by_email.token).unwrap();
        assert_eq!(claims.id, by_email.user.id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let svc = service();
        svc.register(register_input("frank", "frank@example.com")).await.unwrap();

        let wrong_password = svc
            .login(LoginInput { username: Some("frank".into()), email: None, password: "WrongPass1".into() })
            .await;
        let unknown_user = svc
            .login(LoginInput { username: Some("nobody".into()), email: None, password: "WrongPass1".into() })
            .await;

        let a = wrong_password.err().unwrap();
        let b = unknown_user.err().unwrap();
        assert!(matches!(a, AuthError::Unauthorized));
        assert!(matches!(b, AuthError::Unauthorized));
        // identical message for both, no user-enumeration distinction
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn login_requires_an_identifier() {
        let svc = service();
        let res = svc
            .login(LoginInput { username: None, email: None, password: "Passw0rd!".into() })
            .await;
        assert!(matches!(res, Err(AuthError::Validation(_))));
    }
}
