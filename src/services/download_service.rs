//! Domain service for fetching audio from YouTube into the library.
//!
//! This module provides the [`DownloadService`] trait. The implementation
//! drives an [`AudioExtractor`](crate::services::extractor::AudioExtractor),
//! names the produced files, places them in the library directory and
//! records one download row per new file.

use crate::domain::UserId;
use crate::services::extractor::ExtractorError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Domain errors for download operations.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{0}")]
    Validation(String),

    /// The extraction tool failed; carries its message.
    #[error("{0}")]
    Extraction(String),

    /// A playlist produced no usable entry at all.
    #[error("Nenhuma música pôde ser baixada")]
    NoEntries,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for DownloadError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<ExtractorError> for DownloadError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::Spawn(e) => Self::Extraction(format!("Falha ao iniciar o yt-dlp: {e}")),
            other => Self::Extraction(other.to_string()),
        }
    }
}

/// Outcome of a single-video download.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub title: String,
    pub filename: String,
    /// Absolute or library-relative path of the file, ready to be served.
    pub path: PathBuf,
    /// `false` when the caller already had this file recorded.
    pub newly_recorded: bool,
}

/// Outcome of a playlist download.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PlaylistDownloadResult {
    pub playlist_title: Option<String>,
    /// Items newly recorded for the caller.
    pub total: usize,
    /// Items the caller already had.
    pub skipped: usize,
    /// Items the tool could not extract or that could not be placed.
    pub failed: usize,
}

/// Domain service trait for download operations.
#[async_trait::async_trait]
pub trait DownloadService: Send + Sync {
    /// Downloads one video's audio for `owner`.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Validation`] if `url` is not a YouTube URL
    /// - [`DownloadError::Extraction`] with the tool's message on failure
    async fn download_audio(&self, owner: UserId, url: &str)
    -> Result<DownloadResult, DownloadError>;

    /// Downloads every extractable item of a playlist for `owner`.
    ///
    /// Items the tool fails on are skipped. Items the caller already has are
    /// not recorded again.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::NoEntries`] if nothing could be extracted
    /// - [`DownloadError::Extraction`] if the tool itself failed
    async fn download_playlist(
        &self,
        owner: UserId,
        url: &str,
    ) -> Result<PlaylistDownloadResult, DownloadError>;
}
