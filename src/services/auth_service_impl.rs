//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::{AuthConfig, SecurityConfig};
use crate::db::{Store, User};
use crate::domain::{CurrentUser, UserId};
use crate::services::auth_service::{AuthError, AuthService};
use async_trait::async_trait;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=80;

pub struct SeaOrmAuthService {
    store: Store,
    auth: AuthConfig,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, auth: AuthConfig, security: SecurityConfig) -> Self {
        Self {
            store,
            auth,
            security,
        }
    }
}

fn identity_for(user: Option<User>) -> Option<CurrentUser> {
    user.map(|u| CurrentUser {
        id: UserId::new(u.id),
        username: u.username,
        email: u.email,
        is_admin: u.is_admin,
    })
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.store.username_exists(username).await? {
            return Err(AuthError::Validation(
                "Este nome de usuário já está em uso.".to_string(),
            ));
        }

        if self.store.email_exists(&email).await? {
            return Err(AuthError::Validation(
                "Este email já está cadastrado.".to_string(),
            ));
        }

        // The unique indexes still catch a concurrent registration that
        // slipped past the checks above.
        let user = self
            .store
            .create_user(username, &email, password, false, &self.security)
            .await?;

        tracing::info!(user_id = user.id, "Registered new user {}", user.username);
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .verify_credentials(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.store.touch_last_login(user.id).await?;

        Ok(user)
    }

    async fn current_identity(
        &self,
        session_user: Option<UserId>,
    ) -> Result<Option<CurrentUser>, AuthError> {
        if let Some(id) = session_user {
            let user = self.store.get_user(id.value()).await?;
            if user.is_some() {
                return Ok(identity_for(user));
            }
        }

        if self.auth.single_user {
            let email = self.auth.admin_email.trim().to_lowercase();
            let admin = self.store.get_user_by_email(&email).await?;
            return Ok(identity_for(admin));
        }

        Ok(None)
    }

    async fn change_password(
        &self,
        user: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "A nova senha deve ser diferente da atual".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(user.value(), current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation("Senha atual incorreta".to_string()));
        }

        self.store
            .update_user_password(user.value(), new_password, &self.security)
            .await?;

        Ok(())
    }
}

fn validate_username(username: &str) -> Result<&str, AuthError> {
    let trimmed = username.trim();
    if !USERNAME_LEN.contains(&trimmed.chars().count()) {
        return Err(AuthError::Validation(
            "Nome deve ter entre 3 e 80 caracteres".to_string(),
        ));
    }
    Ok(trimmed)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(
            "Senha deve ter no mínimo 6 caracteres".to_string(),
        ));
    }
    Ok(())
}

/// Lowercases and checks the overall `local@domain.tld` shape.
fn normalize_email(email: &str) -> Result<String, AuthError> {
    let invalid = || AuthError::Validation("Email inválido".to_string());

    let email = email.trim().to_lowercase();
    if email.len() > 120 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email)
}
