use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use std::sync::Arc;

use super::library::serve_file;
use super::{ActionResponse, ApiError, ApiJson, AppState, UrlRequest};
use crate::domain::CurrentUser;

fn required_url(payload: UrlRequest) -> Result<String, ApiError> {
    super::types::non_blank(payload.youtube_url)
        .ok_or_else(|| ApiError::validation("URL do YouTube é obrigatória"))
}

/// `attachment` disposition with an ASCII fallback and the RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> Option<HeaderValue> {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    let encoded = urlencoding::encode(filename);

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}"
    ))
    .ok()
}

/// POST /download-audio
///
/// Blocks until the extraction finishes, then streams the file back as an
/// attachment.
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UrlRequest>,
) -> Result<Response, ApiError> {
    let url = required_url(payload)?;

    let result = state
        .shared
        .download_service
        .download_audio(user.id, &url)
        .await?;

    let mut response = serve_file(result.path, &headers).await?;
    if let Some(value) = content_disposition(&result.filename) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// POST /download-playlist
pub async fn download_playlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<UrlRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let url = required_url(payload)?;

    let result = state
        .shared
        .download_service
        .download_playlist(user.id, &url)
        .await?;

    Ok(Json(
        ActionResponse::ok(format!("{} músicas baixadas com sucesso", result.total))
            .with_total(result.total),
    ))
}
