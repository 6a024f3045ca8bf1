//! Domain service for the admin authorization tier.
//!
//! Every operation takes the acting user explicitly and checks the tier
//! itself, independent of any route-level guard.

use crate::db::{OwnedDownload, UserSummary};
use crate::domain::{CurrentUser, UserId};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound(UserId),

    /// An admin tried to delete or demote their own account.
    #[error("{0}")]
    SelfModification(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Global counters shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: u64,
    pub admin_users: u64,
    pub total_downloads: u64,
    pub downloads_last_7_days: u64,
    pub total_history: u64,
    pub total_favorites: u64,
    pub total_playlists: u64,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(&self, actor: &CurrentUser) -> Result<Vec<UserSummary>, AdminError>;

    /// Deletes `target` and everything it owns.
    ///
    /// # Errors
    ///
    /// - [`AdminError::SelfModification`] when `target` is the actor
    /// - [`AdminError::UserNotFound`] when `target` does not exist
    async fn delete_user(&self, actor: &CurrentUser, target: UserId) -> Result<(), AdminError>;

    /// Flips the admin flag of `target` and returns the new value.
    async fn toggle_admin(&self, actor: &CurrentUser, target: UserId) -> Result<bool, AdminError>;

    async fn all_downloads(&self, actor: &CurrentUser) -> Result<Vec<OwnedDownload>, AdminError>;

    async fn stats(&self, actor: &CurrentUser) -> Result<AdminStats, AdminError>;
}
