//! Audio extraction through an external `yt-dlp` process.
//!
//! The extractor only fetches and transcodes into a staging directory. Naming,
//! deduplication and persistence belong to the download orchestrator.

use crate::config::{ExtractorConfig, LibraryConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The tool ran and reported a failure (unavailable video, bad URL, ...).
    #[error("{0}")]
    Tool(String),

    #[error("Failed to start extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Unexpected extractor output: {0}")]
    Output(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Single,
    Playlist,
}

/// One transcoded audio file sitting in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    pub title: String,
    pub video_id: Option<String>,
    pub source_url: Option<String>,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Single(ExtractedItem),
    /// `None` entries are items the tool could not extract.
    Playlist {
        title: Option<String>,
        entries: Vec<Option<ExtractedItem>>,
    },
}

#[async_trait::async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Fetches `url` and writes transcoded audio into `staging`.
    ///
    /// Blocks until the tool exits. There is no timeout.
    async fn extract(
        &self,
        url: &str,
        staging: &Path,
        mode: ExtractMode,
    ) -> Result<Extraction, ExtractorError>;
}

pub struct YtDlpExtractor {
    binary: String,
    extra_args: Vec<String>,
    audio_format: String,
    audio_quality: u32,
}

impl YtDlpExtractor {
    #[must_use]
    pub fn new(extractor: &ExtractorConfig, library: &LibraryConfig) -> Self {
        Self {
            binary: extractor.binary.clone(),
            extra_args: extractor.extra_args.clone(),
            audio_format: library.audio_format.clone(),
            audio_quality: library.audio_quality,
        }
    }

    fn build_args(&self, url: &str, staging: &Path, mode: ExtractMode) -> Vec<String> {
        let template = staging.join("%(id)s.%(ext)s");

        let mut args = vec![
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            self.audio_format.clone(),
            "--audio-quality".to_string(),
            format!("{}K", self.audio_quality),
            "--no-progress".to_string(),
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
        ];

        match mode {
            ExtractMode::Single => args.push("--no-playlist".to_string()),
            ExtractMode::Playlist => {
                args.push("--yes-playlist".to_string());
                args.push("--ignore-errors".to_string());
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait::async_trait]
impl AudioExtractor for YtDlpExtractor {
    async fn extract(
        &self,
        url: &str,
        staging: &Path,
        mode: ExtractMode,
    ) -> Result<Extraction, ExtractorError> {
        let args = self.build_args(url, staging, mode);
        debug!(binary = %self.binary, ?mode, "Spawning extractor");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let tool_error = || {
            ExtractorError::Tool(
                last_error_line(&stderr)
                    .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status)),
            )
        };

        // With --ignore-errors a playlist with some failed items still exits
        // non-zero, so the JSON on stdout decides.
        if !output.status.success() && (mode == ExtractMode::Single || output.stdout.is_empty()) {
            return Err(tool_error());
        }

        if !output.status.success() {
            warn!(status = %output.status, "Extractor reported partial failure");
        }

        let stdout = std::str::from_utf8(&output.stdout)
            .map_err(|_| ExtractorError::Output("stdout is not UTF-8".to_string()))?;

        parse_info_json(stdout, staging, &self.audio_format).map_err(|e| {
            if output.status.success() {
                e
            } else {
                tool_error()
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct InfoJson {
    #[serde(rename = "_type")]
    kind: Option<String>,
    id: Option<String>,
    title: Option<String>,
    webpage_url: Option<String>,
    #[serde(default)]
    requested_downloads: Vec<RequestedDownload>,
    entries: Option<Vec<Option<InfoJson>>>,
}

#[derive(Debug, Deserialize)]
struct RequestedDownload {
    filepath: Option<String>,
}

/// Parses the `--dump-single-json` document printed after processing.
///
/// The post-processed path comes from `requested_downloads[].filepath`; when
/// absent it is rebuilt from the output template as `<staging>/<id>.<fmt>`.
pub fn parse_info_json(
    stdout: &str,
    staging: &Path,
    audio_format: &str,
) -> Result<Extraction, ExtractorError> {
    // Only the last non-empty line is the document; earlier lines can be
    // warnings printed to stdout by some extractors.
    let document = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ExtractorError::Output("empty output".to_string()))?;

    let info: InfoJson =
        serde_json::from_str(document).map_err(|e| ExtractorError::Output(e.to_string()))?;

    let is_playlist = info.entries.is_some() || info.kind.as_deref() == Some("playlist");

    if is_playlist {
        let entries = info
            .entries
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.and_then(|e| item_from(e, staging, audio_format)))
            .collect();

        return Ok(Extraction::Playlist {
            title: info.title,
            entries,
        });
    }

    item_from(info, staging, audio_format)
        .map(Extraction::Single)
        .ok_or_else(|| ExtractorError::Output("missing video id".to_string()))
}

fn item_from(info: InfoJson, staging: &Path, audio_format: &str) -> Option<ExtractedItem> {
    let file = info
        .requested_downloads
        .into_iter()
        .find_map(|d| d.filepath)
        .map(PathBuf::from)
        .or_else(|| {
            info.id
                .as_ref()
                .map(|id| staging.join(format!("{id}.{audio_format}")))
        })?;

    Some(ExtractedItem {
        title: info.title.unwrap_or_default(),
        video_id: info.id,
        source_url: info.webpage_url,
        file,
    })
}

/// Last `ERROR:` line from yt-dlp's stderr, without the prefix.
#[must_use]
pub fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("ERROR:"))
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
}
