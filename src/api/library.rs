//! Library endpoints. Reconciliation and path checks live in
//! [`LibraryService`](crate::services::LibraryService); handlers only map
//! HTTP to service calls.

use axum::{
    Extension, Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_http::services::ServeFile;

use super::{ActionResponse, ApiError, AppState, FileName};
use crate::domain::CurrentUser;
use crate::services::LibraryItem;

/// GET /library
pub async fn list_library(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<LibraryItem>>, ApiError> {
    Ok(Json(state.shared.library_service.list(user.id).await?))
}

/// GET /library/stream/{filename}
pub async fn stream_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    FileName(filename): FileName,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let path = state
        .shared
        .library_service
        .resolve_stream(user.id, &filename)
        .await?;

    serve_file(path, &headers).await
}

/// DELETE /library/{filename}
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    FileName(filename): FileName,
) -> Result<Json<ActionResponse>, ApiError> {
    state
        .shared
        .library_service
        .delete(user.id, &filename)
        .await?;

    Ok(Json(ActionResponse::ok("Arquivo removido da biblioteca")))
}

/// Serves a file through `ServeFile`, forwarding the client's `Range` header.
pub async fn serve_file(
    path: std::path::PathBuf,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let mut builder = Request::builder();
    if let Some(range) = headers.get(header::RANGE) {
        builder = builder.header(header::RANGE, range.clone());
    }

    let req = builder
        .body(Body::empty())
        .map_err(|e| ApiError::internal(format!("Failed to build request: {e}")))?;

    match ServeFile::new(path).try_call(req).await {
        Ok(res) => Ok(res.into_response()),
        Err(e) => Err(ApiError::internal(format!("Streaming error: {e}"))),
    }
}
