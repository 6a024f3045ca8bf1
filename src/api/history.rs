use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{DEFAULT_HISTORY_LIMIT, validate_limit};
use super::{ActionResponse, ApiError, ApiJson, AppState, MediaRequest};
use crate::db::HistoryEntry;
use crate::domain::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

/// GET /history?limit=N
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "Rejected history query");
        ApiError::validation("Limite inválido")
    })?;
    let limit = validate_limit(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?;

    let history = state.store().get_history(user.id.value(), limit).await?;
    Ok(Json(history))
}

/// POST /history
pub async fn add_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<MediaRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let media = payload
        .into_media()
        .ok_or_else(|| ApiError::validation("URL do YouTube é obrigatória"))?;

    let id = state.store().add_history(user.id.value(), &media).await?;

    Ok(Json(ActionResponse::ok("Adicionado ao histórico").with_id(id)))
}

/// DELETE /history
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ActionResponse>, ApiError> {
    let removed = state.store().clear_history(user.id.value()).await?;
    tracing::debug!(user_id = %user.id, removed, "History cleared");

    Ok(Json(ActionResponse::ok("Histórico limpo")))
}
