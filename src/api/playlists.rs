use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::types::non_blank;
use super::{ActionResponse, ApiError, ApiJson, AppState, PlaylistRequest, RecordId};
use crate::db::PlaylistEntry;
use crate::domain::CurrentUser;

/// GET /playlists
pub async fn list_playlists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<PlaylistEntry>>, ApiError> {
    Ok(Json(state.store().get_playlists(user.id.value()).await?))
}

/// POST /playlists
pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<PlaylistRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let missing = || ApiError::validation("Nome e URL são obrigatórios");
    let name = non_blank(payload.name).ok_or_else(missing)?;
    let media = payload.media.into_media().ok_or_else(missing)?;

    let id = state
        .store()
        .create_playlist(user.id.value(), &name, &media)
        .await?;

    Ok(Json(ActionResponse::ok("Playlist criada").with_id(id)))
}

/// DELETE /playlists/{id}
pub async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    RecordId(id): RecordId,
) -> Result<Json<ActionResponse>, ApiError> {
    if !state.store().delete_playlist(user.id.value(), id).await? {
        return Err(ApiError::not_found("Playlist não encontrada"));
    }

    Ok(Json(ActionResponse::ok("Playlist removida")))
}
