//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{PermissionSet, RegisterUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create a user account. New accounts carry no group memberships, so
    /// they start with an empty permission set.
    pub async fn register(&self, payload: &RegisterUser) -> AppResult<User> {
        if self
            .repository
            .users
            .get_by_login(&payload.login)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A user with this login already exists".to_string(),
            ));
        }

        let hash = self.hash_password(&payload.password)?;
        let user = self.repository.users.create(&payload.login, &hash).await?;

        tracing::info!("Registered user id={} login={:?}", user.id, user.login);
        Ok(user)
    }

    /// Authenticate by login and password, returning a bearer token that
    /// embeds the resolved permission set.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> AppResult<(String, User, PermissionSet)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid login or password".to_string(),
            ));
        }

        let permissions = self.repository.users.permissions_for_user(user.id).await?;

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            permissions: permissions.clone(),
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user, permissions))
    }

    /// Create the configured admin account on first startup and attach it
    /// to the Admin group. A no-op when the account already exists or the
    /// bootstrap login is empty.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let login = &self.config.bootstrap_admin_login;
        if login.is_empty() {
            return Ok(());
        }
        if self.repository.users.get_by_login(login).await?.is_some() {
            return Ok(());
        }

        let hash = self.hash_password(&self.config.bootstrap_admin_password)?;
        let user = self.repository.users.create(login, &hash).await?;

        let group_id = self
            .repository
            .users
            .group_id_by_name("Admin")
            .await?
            .ok_or_else(|| AppError::Internal("Admin group is missing".to_string()))?;
        self.repository.users.add_to_group(user.id, group_id).await?;

        tracing::info!("Created bootstrap admin user {:?}", login);
        Ok(())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
