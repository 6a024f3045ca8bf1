use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ActionResponse, ApiError, AppState, RecordId};
use crate::db::{OwnedDownload, UserSummary};
use crate::domain::{CurrentUser, UserId};
use crate::services::AdminStats;

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.shared.admin_service.list_users(&actor).await?))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
    RecordId(id): RecordId,
) -> Result<Json<ActionResponse>, ApiError> {
    let target = UserId::new(id);

    state
        .shared
        .admin_service
        .delete_user(&actor, target)
        .await?;

    Ok(Json(ActionResponse::ok("Usuário excluído com sucesso")))
}

/// POST /admin/users/{id}/toggle-admin
pub async fn toggle_admin(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
    RecordId(id): RecordId,
) -> Result<Json<ActionResponse>, ApiError> {
    let target = UserId::new(id);

    let is_admin = state
        .shared
        .admin_service
        .toggle_admin(&actor, target)
        .await?;

    let message = if is_admin {
        "Usuário promovido a administrador"
    } else {
        "Privilégios de administrador removidos"
    };

    Ok(Json(ActionResponse::ok(message).with_is_admin(is_admin)))
}

/// GET /admin/downloads
pub async fn all_downloads(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
) -> Result<Json<Vec<OwnedDownload>>, ApiError> {
    Ok(Json(state.shared.admin_service.all_downloads(&actor).await?))
}

/// GET /admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(state.shared.admin_service.stats(&actor).await?))
}
