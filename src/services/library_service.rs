//! Domain service for the caller's audio library.
//!
//! The library directory is flat and shared between users. What a user sees
//! is the intersection of their download rows with the files actually on
//! disk, computed at read time. Missing files are filtered out of listings;
//! their rows stay until an explicit delete.

use crate::domain::UserId;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// Wrong extension or a name that is not a single path segment.
    #[error("{0}")]
    BadRequest(String),

    #[error("Arquivo não encontrado")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LibraryItem {
    pub title: String,
    pub filename: String,
    pub downloaded_at: String,
}

#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    /// Caller's downloads whose file still exists, most recent first.
    async fn list(&self, owner: UserId) -> Result<Vec<LibraryItem>, LibraryError>;

    /// Path of a file the caller may stream.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::BadRequest`] for a foreign extension or a path, checked
    ///   before the filesystem is touched
    /// - [`LibraryError::NotFound`] when the caller has no row for the file or
    ///   the file is gone
    async fn resolve_stream(&self, owner: UserId, filename: &str)
    -> Result<PathBuf, LibraryError>;

    /// Removes the caller's row and, when nobody else references it, the file.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::NotFound`] when neither a row nor a removable file existed
    async fn delete(&self, owner: UserId, filename: &str) -> Result<(), LibraryError>;
}
