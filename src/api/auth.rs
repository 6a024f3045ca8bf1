use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::{Expiry, Session};

use super::{ActionResponse, ApiError, ApiJson, AppState};
use crate::domain::{AccessTier, CurrentUser, UserId};

pub const USER_ID_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: CurrentUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller from the session and makes it available to handlers
/// as an `Extension<CurrentUser>`.
///
/// The identity is re-read from the store on every request, so a deleted
/// account or a revoked admin flag takes effect immediately.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_user = session
        .get::<i32>(USER_ID_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .map(UserId::new);

    let Some(user) = state
        .shared
        .auth_service
        .current_identity(session_user)
        .await?
    else {
        return Err(ApiError::unauthenticated());
    };

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Rejects callers without the admin tier. Runs after [`auth_middleware`].
pub async fn require_admin(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.has_tier(AccessTier::Admin) {
        tracing::warn!(user_id = %user.id, path = %request.uri().path(), "Non-admin hit admin route");
        return Err(ApiError::Forbidden("Acesso negado".to_string()));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.config().auth.registration_enabled {
        return Err(ApiError::Forbidden(
            "Cadastro de novos usuários desativado".to_string(),
        ));
    }

    let user = state
        .shared
        .auth_service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Conta criada com sucesso! Faça login.").with_id(user.id)),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .shared
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    // New id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to cycle session: {e}")))?;

    session
        .insert(USER_ID_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    if payload.remember_me {
        let days = state.config().server.remember_me_days;
        session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(days))));
    }

    tracing::info!(user_id = user.id, remember_me = payload.remember_me, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login realizado com sucesso".to_string(),
        user: CurrentUser {
            id: UserId::new(user.id),
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
        },
    }))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ActionResponse>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ActionResponse::ok("Você saiu da sua conta")))
}

/// GET /auth/me
pub async fn get_current_user(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state
        .shared
        .auth_service
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(ActionResponse::ok("Senha alterada com sucesso")))
}
