//! `SeaORM` implementation of the `LibraryService` trait.

use crate::config::Config;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::library_service::{LibraryError, LibraryItem, LibraryService};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SeaOrmLibraryService {
    store: Store,
    library_dir: PathBuf,
    audio_format: String,
}

impl SeaOrmLibraryService {
    #[must_use]
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            library_dir: PathBuf::from(&config.library.library_path),
            audio_format: config.library.audio_format.to_lowercase(),
        }
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        self.library_dir.join(filename)
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

/// Checks the extension first, then that the name is one plain path segment.
pub fn validate_filename(filename: &str, audio_format: &str) -> Result<(), LibraryError> {
    let extension = format!(".{audio_format}");
    if !filename.to_lowercase().ends_with(&extension) {
        return Err(LibraryError::BadRequest(format!(
            "Apenas arquivos {} são permitidos",
            audio_format.to_uppercase()
        )));
    }

    let mut components = Path::new(filename).components();
    let single_segment = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );

    if !single_segment || filename.contains(['/', '\\', '\0']) || filename.starts_with('.') {
        return Err(LibraryError::BadRequest(
            "Nome de arquivo inválido".to_string(),
        ));
    }

    Ok(())
}

#[async_trait::async_trait]
impl LibraryService for SeaOrmLibraryService {
    async fn list(&self, owner: UserId) -> Result<Vec<LibraryItem>, LibraryError> {
        let rows = self.store.list_downloads(owner.value()).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            if file_exists(&self.file_path(&row.filename)).await {
                items.push(LibraryItem {
                    title: row.title,
                    filename: row.filename,
                    downloaded_at: row.downloaded_at,
                });
            } else {
                debug!(filename = %row.filename, "Skipping download whose file is missing");
            }
        }

        Ok(items)
    }

    async fn resolve_stream(
        &self,
        owner: UserId,
        filename: &str,
    ) -> Result<PathBuf, LibraryError> {
        validate_filename(filename, &self.audio_format)?;

        if !self.store.has_download(owner.value(), filename).await? {
            return Err(LibraryError::NotFound);
        }

        let path = self.file_path(filename);
        if !file_exists(&path).await {
            return Err(LibraryError::NotFound);
        }

        Ok(path)
    }

    async fn delete(&self, owner: UserId, filename: &str) -> Result<(), LibraryError> {
        validate_filename(filename, &self.audio_format)?;

        let had_row = self.store.delete_download(owner.value(), filename).await?;

        // Other users may have downloaded the same title into the shared
        // directory; their copy must survive.
        let still_referenced = self.store.download_references(filename).await? > 0;

        let path = self.file_path(filename);
        let removed_file = if !still_referenced && file_exists(&path).await {
            tokio::fs::remove_file(&path).await?;
            true
        } else {
            false
        };

        if !had_row && !removed_file {
            return Err(LibraryError::NotFound);
        }

        info!(user_id = %owner, filename, had_row, removed_file, "Library entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_extensions_before_anything_else() {
        let err = validate_filename("../../etc/passwd", "mp3").unwrap_err();
        assert!(matches!(err, LibraryError::BadRequest(m) if m == "Apenas arquivos MP3 são permitidos"));
        assert!(validate_filename("song.wav", "mp3").is_err());
    }

    #[test]
    fn rejects_paths() {
        for name in ["../secret.mp3", "a/b.mp3", "a\\b.mp3", "/abs.mp3", ".hidden.mp3"] {
            let err = validate_filename(name, "mp3").unwrap_err();
            assert!(
                matches!(&err, LibraryError::BadRequest(m) if m == "Nome de arquivo inválido"),
                "{name}"
            );
        }
    }

    #[test]
    fn accepts_plain_names() {
        assert!(validate_filename("Song A.mp3", "mp3").is_ok());
        assert!(validate_filename("SONG.MP3", "mp3").is_ok());
    }
}
