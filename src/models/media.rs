use serde::{Deserialize, Serialize};

/// Reference to a piece of YouTube media as reported by the client player.
///
/// Shared by history events, favorites and playlist bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub title: String,
    pub youtube_url: String,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub thumbnail: Option<String>,
}

impl MediaRef {
    #[must_use]
    pub fn new(title: impl Into<String>, youtube_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            youtube_url: youtube_url.into(),
            video_id: None,
            playlist_id: None,
            thumbnail: None,
        }
    }
}
