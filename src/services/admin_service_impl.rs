//! `SeaORM` implementation of the `AdminService` trait.

use crate::db::{OwnedDownload, Store, UserSummary};
use crate::domain::{AccessTier, CurrentUser, UserId};
use crate::services::admin_service::{AdminError, AdminService, AdminStats};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAdminService {
    store: Store,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

const fn require_admin(actor: &CurrentUser) -> Result<(), AdminError> {
    if actor.has_tier(AccessTier::Admin) {
        Ok(())
    } else {
        Err(AdminError::Forbidden)
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn list_users(&self, actor: &CurrentUser) -> Result<Vec<UserSummary>, AdminError> {
        require_admin(actor)?;
        Ok(self.store.list_users_with_counts().await?)
    }

    async fn delete_user(&self, actor: &CurrentUser, target: UserId) -> Result<(), AdminError> {
        require_admin(actor)?;

        if actor.id == target {
            return Err(AdminError::SelfModification(
                "Você não pode excluir sua própria conta".to_string(),
            ));
        }

        if !self.store.delete_user(target.value()).await? {
            return Err(AdminError::UserNotFound(target));
        }

        info!(actor = %actor.id, target = %target, "User deleted by admin");
        Ok(())
    }

    async fn toggle_admin(&self, actor: &CurrentUser, target: UserId) -> Result<bool, AdminError> {
        require_admin(actor)?;

        if actor.id == target {
            return Err(AdminError::SelfModification(
                "Você não pode alterar seu próprio status de administrador".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(target.value())
            .await?
            .ok_or(AdminError::UserNotFound(target))?;

        let is_admin = !user.is_admin;
        self.store.set_user_admin(target.value(), is_admin).await?;

        info!(actor = %actor.id, target = %target, is_admin, "Admin flag toggled");
        Ok(is_admin)
    }

    async fn all_downloads(&self, actor: &CurrentUser) -> Result<Vec<OwnedDownload>, AdminError> {
        require_admin(actor)?;
        Ok(self.store.list_all_downloads().await?)
    }

    async fn stats(&self, actor: &CurrentUser) -> Result<AdminStats, AdminError> {
        require_admin(actor)?;

        let week_ago = (chrono::Utc::now() - chrono::Duration::days(7))
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

        Ok(AdminStats {
            total_users: self.store.user_count().await?,
            admin_users: self.store.admin_count().await?,
            total_downloads: self.store.download_count().await?,
            downloads_last_7_days: self.store.download_count_since(&week_ago).await?,
            total_history: self.store.history_count().await?,
            total_favorites: self.store.favorite_count().await?,
            total_playlists: self.store.playlist_count().await?,
        })
    }
}
