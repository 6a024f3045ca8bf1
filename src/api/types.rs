use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::ApiError;
use crate::models::MediaRef;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Outcome of an action endpoint (add, remove, download, ...).
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
            total: None,
            is_admin: None,
        }
    }

    /// A request that was valid but changed nothing.
    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    #[must_use]
    pub const fn with_is_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }
}

/// JSON body extractor whose rejections use the API error shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => value,
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
                return Err(ApiError::validation("Dados inválidos"));
            }
        };

        parse_object(value).map(Self)
    }
}

/// Derived struct deserializers also accept sequences; bodies must be objects.
fn parse_object<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    if !value.is_object() {
        return Err(ApiError::validation("Dados inválidos"));
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Rejected JSON body");
        ApiError::validation("Dados inválidos")
    })
}

/// Positive record id from the `{id}` path segment.
pub struct RecordId(pub i32);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::validation("ID inválido"))?;

        super::validation::validate_record_id(id).map(Self)
    }
}

/// Library file name from the `{filename}` path segment.
pub struct FileName(pub String);

impl<S> FromRequestParts<S> for FileName
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::validation("Nome de arquivo inválido"))?;

        Ok(Self(name))
    }
}

pub const UNTITLED: &str = "Sem título";

/// Media reported by the player. Every field is optional on the wire so that
/// missing values produce a localized validation message.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MediaRequest {
    pub title: Option<String>,
    pub youtube_url: Option<String>,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub thumbnail: Option<String>,
}

impl MediaRequest {
    /// Returns `None` when `youtube_url` is missing or blank.
    pub fn into_media(self) -> Option<MediaRef> {
        let url = non_blank(self.youtube_url)?;
        Some(MediaRef {
            title: non_blank(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            youtube_url: url,
            video_id: non_blank(self.video_id),
            playlist_id: non_blank(self.playlist_id),
            thumbnail: non_blank(self.thumbnail),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistRequest {
    pub name: Option<String>,
    #[serde(flatten)]
    pub media: MediaRequest,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UrlRequest {
    pub youtube_url: Option<String>,
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
