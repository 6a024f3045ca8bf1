use crate::config::{AuthConfig, SecurityConfig};
use crate::models::MediaRef;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::download::{DownloadEntry, OwnedDownload};
pub use repositories::favorite::FavoriteEntry;
pub use repositories::history::HistoryEntry;
pub use repositories::playlist::PlaylistEntry;
pub use repositories::user::{User, UserSummary};

/// Timestamp format used by every table: RFC 3339, UTC, fixed precision so
/// that lexical order matches chronological order.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Persistence gateway over the five record types.
///
/// Each call checks a connection out of the pool for the duration of one
/// operation; nothing holds a connection across a request.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn download_repo(&self) -> repositories::download::DownloadRepository {
        repositories::download::DownloadRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::history::HistoryRepository {
        repositories::history::HistoryRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn playlist_repo(&self) -> repositories::playlist::PlaylistRepository {
        repositories::playlist::PlaylistRepository::new(self.conn.clone())
    }

    /// Creates the configured administrative account unless a user with its
    /// email already exists. Safe to call on every startup.
    pub async fn ensure_bootstrap_admin(
        &self,
        auth: &AuthConfig,
        security: &SecurityConfig,
    ) -> Result<bool> {
        let repo = self.user_repo();
        let email = auth.admin_email.trim().to_lowercase();
        if repo.email_exists(&email).await? {
            return Ok(false);
        }

        repo.create(
            &auth.admin_username,
            &email,
            &auth.admin_password,
            true,
            security,
        )
        .await?;

        info!("Created bootstrap admin account <{}>", email);
        Ok(true)
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, is_admin, security)
            .await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn verify_user_password(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password_by_id(id, password).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().touch_last_login(id).await
    }

    pub async fn set_user_admin(&self, id: i32, is_admin: bool) -> Result<bool> {
        self.user_repo().set_admin(id, is_admin).await
    }

    pub async fn list_users_with_counts(&self) -> Result<Vec<UserSummary>> {
        self.user_repo().list_with_download_counts().await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete_cascade(id).await
    }

    pub async fn user_count(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn admin_count(&self) -> Result<u64> {
        self.user_repo().count_admins().await
    }

    // Downloads

    pub async fn record_download(
        &self,
        user_id: i32,
        title: &str,
        youtube_url: &str,
        filename: &str,
    ) -> Result<bool> {
        self.download_repo()
            .record(user_id, title, youtube_url, filename)
            .await
    }

    pub async fn has_download(&self, user_id: i32, filename: &str) -> Result<bool> {
        self.download_repo()
            .exists_for_user(user_id, filename)
            .await
    }

    pub async fn list_downloads(&self, user_id: i32) -> Result<Vec<DownloadEntry>> {
        self.download_repo().list_for_user(user_id).await
    }

    pub async fn delete_download(&self, user_id: i32, filename: &str) -> Result<bool> {
        self.download_repo()
            .delete_for_user(user_id, filename)
            .await
    }

    pub async fn download_references(&self, filename: &str) -> Result<u64> {
        self.download_repo().count_referencing(filename).await
    }

    pub async fn list_all_downloads(&self) -> Result<Vec<OwnedDownload>> {
        self.download_repo().list_all_with_owner().await
    }

    pub async fn download_count(&self) -> Result<u64> {
        self.download_repo().count().await
    }

    pub async fn download_count_since(&self, since: &str) -> Result<u64> {
        self.download_repo().count_since(since).await
    }

    // History

    pub async fn add_history(&self, user_id: i32, media: &MediaRef) -> Result<i32> {
        self.history_repo().add(user_id, media).await
    }

    pub async fn get_history(&self, user_id: i32, limit: u64) -> Result<Vec<HistoryEntry>> {
        self.history_repo().list(user_id, limit).await
    }

    pub async fn clear_history(&self, user_id: i32) -> Result<u64> {
        self.history_repo().clear(user_id).await
    }

    pub async fn history_count(&self) -> Result<u64> {
        self.history_repo().count().await
    }

    // Favorites

    pub async fn add_favorite(&self, user_id: i32, media: &MediaRef) -> Result<bool> {
        self.favorite_repo().add(user_id, media).await
    }

    pub async fn get_favorites(&self, user_id: i32) -> Result<Vec<FavoriteEntry>> {
        self.favorite_repo().list(user_id).await
    }

    pub async fn remove_favorite(&self, user_id: i32, id: i32) -> Result<bool> {
        self.favorite_repo().remove(user_id, id).await
    }

    pub async fn favorite_count(&self) -> Result<u64> {
        self.favorite_repo().count().await
    }

    // Playlists

    pub async fn create_playlist(
        &self,
        user_id: i32,
        name: &str,
        media: &MediaRef,
    ) -> Result<i32> {
        self.playlist_repo().create(user_id, name, media).await
    }

    pub async fn get_playlists(&self, user_id: i32) -> Result<Vec<PlaylistEntry>> {
        self.playlist_repo().list(user_id).await
    }

    pub async fn delete_playlist(&self, user_id: i32, id: i32) -> Result<bool> {
        self.playlist_repo().delete(user_id, id).await
    }

    pub async fn playlist_count(&self) -> Result<u64> {
        self.playlist_repo().count().await
    }
}
