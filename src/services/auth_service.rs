//! Domain service for authentication and user identity.
//!
//! Handles registration, credential checks, identity resolution for a
//! session, and password changes. Session storage itself belongs to the API
//! layer; this service only sees the user id the session carries.

use crate::db::User;
use crate::domain::{CurrentUser, UserId};
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email ou senha inválidos")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a non-admin account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when the username or email is taken,
    /// the username is not 3 to 80 characters, the email is malformed, or the
    /// password is shorter than 6 characters.
    async fn register(&self, username: &str, email: &str, password: &str)
    -> Result<User, AuthError>;

    /// Verifies credentials and records the login time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, without saying which.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Resolves the identity carried by a session.
    ///
    /// `None` means anonymous. Unknown ids (deleted accounts) resolve to
    /// anonymous as well.
    async fn current_identity(
        &self,
        session_user: Option<UserId>,
    ) -> Result<Option<CurrentUser>, AuthError>;

    /// Changes a user's password after checking the current one.
    async fn change_password(
        &self,
        user: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
