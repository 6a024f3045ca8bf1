use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ActionResponse, ApiError, ApiJson, AppState, MediaRequest, RecordId};
use crate::db::FavoriteEntry;
use crate::domain::CurrentUser;

/// GET /favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<FavoriteEntry>>, ApiError> {
    Ok(Json(state.store().get_favorites(user.id.value()).await?))
}

/// POST /favorites
///
/// A duplicate is not an error: it answers `success: false`.
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<MediaRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let media = payload
        .into_media()
        .ok_or_else(|| ApiError::validation("URL do YouTube é obrigatória"))?;

    let inserted = state.store().add_favorite(user.id.value(), &media).await?;

    Ok(Json(if inserted {
        ActionResponse::ok("Adicionado aos favoritos")
    } else {
        ActionResponse::unchanged("Já está nos favoritos")
    }))
}

/// DELETE /favorites/{id}
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    RecordId(id): RecordId,
) -> Result<Json<ActionResponse>, ApiError> {
    if !state.store().remove_favorite(user.id.value(), id).await? {
        return Err(ApiError::not_found("Favorito não encontrado"));
    }

    Ok(Json(ActionResponse::ok("Removido dos favoritos")))
}
