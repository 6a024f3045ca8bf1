use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, AudioExtractor, AuthService, DownloadService, LibraryService,
    SeaOrmAdminService, SeaOrmAuthService, SeaOrmDownloadService, SeaOrmLibraryService,
    YtDlpExtractor,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub admin_service: Arc<dyn AdminService>,

    pub download_service: Arc<dyn DownloadService>,

    pub library_service: Arc<dyn LibraryService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let extractor = Arc::new(YtDlpExtractor::new(&config.extractor, &config.library));
        Self::with_extractor(config, extractor).await
    }

    /// Builds the state around a caller-supplied extractor instead of `yt-dlp`.
    pub async fn with_extractor(
        config: Config,
        extractor: Arc<dyn AudioExtractor>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store
            .ensure_bootstrap_admin(&config.auth, &config.security)
            .await?;

        tokio::fs::create_dir_all(&config.library.library_path).await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.auth.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let admin_service =
            Arc::new(SeaOrmAdminService::new(store.clone())) as Arc<dyn AdminService>;

        let download_service = Arc::new(SeaOrmDownloadService::new(
            store.clone(),
            &config,
            extractor,
        )) as Arc<dyn DownloadService>;

        let library_service =
            Arc::new(SeaOrmLibraryService::new(store.clone(), &config)) as Arc<dyn LibraryService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            admin_service,
            download_service,
            library_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
