//! Extractor-backed implementation of the `DownloadService` trait.

use crate::config::Config;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::download_service::{
    DownloadError, DownloadResult, DownloadService, PlaylistDownloadResult,
};
use crate::services::extractor::{AudioExtractor, ExtractMode, ExtractedItem, Extraction};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

const STAGING_DIR: &str = ".staging";

static YOUTUBE_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^https?://((www\.|m\.|music\.)?youtube\.com|youtu\.be)(/|$)").ok()
});

pub struct SeaOrmDownloadService {
    store: Store,
    library_dir: PathBuf,
    audio_format: String,
    extractor: Arc<dyn AudioExtractor>,
}

impl SeaOrmDownloadService {
    #[must_use]
    pub fn new(store: Store, config: &Config, extractor: Arc<dyn AudioExtractor>) -> Self {
        Self {
            store,
            library_dir: PathBuf::from(&config.library.library_path),
            audio_format: config.library.audio_format.to_lowercase(),
            extractor,
        }
    }

    async fn create_staging(&self) -> Result<PathBuf, DownloadError> {
        let staging = self
            .library_dir
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&staging).await?;
        Ok(staging)
    }

    async fn remove_staging(staging: &Path) {
        if let Err(e) = tokio::fs::remove_dir_all(staging).await {
            warn!(path = ?staging, error = %e, "Failed to remove staging directory");
        }
    }

    /// Moves a staged file into the library under its sanitized name.
    async fn place(&self, item: &ExtractedItem) -> Result<(String, PathBuf), DownloadError> {
        let filename = audio_filename(&item.title, item.video_id.as_deref(), &self.audio_format);
        let destination = self.library_dir.join(&filename);
        move_file(&item.file, &destination).await?;
        Ok((filename, destination))
    }

    async fn fetch_single(
        &self,
        owner: UserId,
        url: &str,
        staging: &Path,
    ) -> Result<DownloadResult, DownloadError> {
        let item = match self.extractor.extract(url, staging, ExtractMode::Single).await? {
            Extraction::Single(item) => item,
            Extraction::Playlist { entries, .. } => entries
                .into_iter()
                .flatten()
                .next()
                .ok_or(DownloadError::NoEntries)?,
        };

        let (filename, path) = self.place(&item).await?;
        let newly_recorded = self
            .store
            .record_download(owner.value(), &item.title, url, &filename)
            .await?;

        Ok(DownloadResult {
            title: item.title,
            filename,
            path,
            newly_recorded,
        })
    }

    async fn fetch_playlist(
        &self,
        owner: UserId,
        url: &str,
        staging: &Path,
    ) -> Result<PlaylistDownloadResult, DownloadError> {
        let (playlist_title, entries) =
            match self.extractor.extract(url, staging, ExtractMode::Playlist).await? {
                Extraction::Playlist { title, entries } => (title, entries),
                Extraction::Single(item) => (None, vec![Some(item)]),
            };

        if entries.iter().all(Option::is_none) {
            return Err(DownloadError::NoEntries);
        }

        let mut summary = PlaylistDownloadResult {
            playlist_title,
            ..Default::default()
        };

        for entry in entries {
            let Some(item) = entry else {
                summary.failed += 1;
                continue;
            };

            let filename = audio_filename(&item.title, item.video_id.as_deref(), &self.audio_format);
            if self.store.has_download(owner.value(), &filename).await? {
                summary.skipped += 1;
                continue;
            }

            if let Err(e) = self.place(&item).await {
                warn!(title = %item.title, error = %e, "Failed to place playlist item");
                summary.failed += 1;
                continue;
            }

            let source = item.source_url.as_deref().unwrap_or(url);
            if self
                .store
                .record_download(owner.value(), &item.title, source, &filename)
                .await?
            {
                summary.total += 1;
            } else {
                summary.skipped += 1;
            }
        }

        if summary.total == 0 && summary.skipped == 0 {
            return Err(DownloadError::NoEntries);
        }

        Ok(summary)
    }

    fn record_outcome(kind: &'static str, outcome: &'static str) {
        metrics::counter!("downloads_total", "kind" => kind, "outcome" => outcome).increment(1);
    }
}

#[async_trait::async_trait]
impl DownloadService for SeaOrmDownloadService {
    async fn download_audio(
        &self,
        owner: UserId,
        url: &str,
    ) -> Result<DownloadResult, DownloadError> {
        let url = validate_url(url)?;

        let staging = self.create_staging().await?;
        let result = self.fetch_single(owner, url, &staging).await;
        Self::remove_staging(&staging).await;

        match &result {
            Ok(done) => {
                Self::record_outcome("single", "success");
                info!(user_id = %owner, filename = %done.filename, "Audio downloaded");
            }
            Err(DownloadError::Validation(_)) => {}
            Err(e) => {
                Self::record_outcome("single", "failure");
                error!(user_id = %owner, url, error = %e, "Audio download failed");
            }
        }

        result
    }

    async fn download_playlist(
        &self,
        owner: UserId,
        url: &str,
    ) -> Result<PlaylistDownloadResult, DownloadError> {
        let url = validate_url(url)?;

        let staging = self.create_staging().await?;
        let result = self.fetch_playlist(owner, url, &staging).await;
        Self::remove_staging(&staging).await;

        match &result {
            Ok(summary) => {
                Self::record_outcome("playlist", "success");
                info!(
                    user_id = %owner,
                    recorded = summary.total,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Playlist downloaded"
                );
            }
            Err(DownloadError::Validation(_)) => {}
            Err(e) => {
                Self::record_outcome("playlist", "failure");
                error!(user_id = %owner, url, error = %e, "Playlist download failed");
            }
        }

        result
    }
}

fn validate_url(url: &str) -> Result<&str, DownloadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DownloadError::Validation(
            "URL do YouTube é obrigatória".to_string(),
        ));
    }
    if !is_youtube_url(url) {
        return Err(DownloadError::Validation(
            "URL do YouTube inválida".to_string(),
        ));
    }
    Ok(url)
}

#[must_use]
pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_URL
        .as_ref()
        .is_some_and(|re| re.is_match(&url.to_lowercase()))
}

/// Keeps alphanumerics, spaces, `-` and `_`, then trims.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Library filename for a title, falling back to the video id and then to
/// `audio` when nothing survives sanitization.
#[must_use]
pub fn audio_filename(title: &str, video_id: Option<&str>, audio_format: &str) -> String {
    let mut stem = sanitize_title(title);
    if stem.is_empty() {
        stem = video_id.map(sanitize_title).unwrap_or_default();
    }
    if stem.is_empty() {
        stem = "audio".to_string();
    }
    format!("{stem}.{audio_format}")
}

async fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(e) = tokio::fs::rename(source, destination).await {
        warn!("Rename failed, falling back to copy: {}", e);
        tokio::fs::copy(source, destination).await?;
        tokio::fs::remove_file(source).await?;
    }
    Ok(())
}
