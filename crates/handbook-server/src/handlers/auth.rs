use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use handbook_shared::api::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use handbook_shared::User;
use uuid::Uuid;

use crate::auth::{authenticate, bearer_token, create_user, issue_token, revoke, AuthUser};
use crate::error::AppError;
use crate::routes::AppState;

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user_id = match authenticate(&state.db, &req.username, &req.password).await {
        Ok(user_id) => user_id,
        Err(AppError::Unauthorized) => {
            tracing::warn!("Failed login attempt for '{}'", req.username);
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    let access_token = issue_token(&state.db, user_id, state.config.session_ttl_secs).await?;
    tracing::info!("User '{}' logged in", req.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token,
    }))
}

/// POST /api/admin/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if !state.config.allow_registration {
        return Err(AppError::NotFound);
    }

    create_user(&state.db, req.username.trim(), &req.password).await?;
    tracing::info!("Registered user '{}'", req.username.trim());

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(token) = bearer_token(&headers) {
        revoke(&state.db, token).await?;
    }
    tracing::info!("User '{}' logged out", user.username);

    Ok(Json(MessageResponse::new("Logged out")))
}

/// GET /api/admin/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let row: Option<(Uuid, String, DateTime<Utc>, Option<DateTime<Utc>>)> = sqlx::query_as(
        "SELECT id, username, created_at, last_login_at FROM users WHERE id = ?",
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    let (id, username, created_at, last_login_at) = row.ok_or(AppError::NotFound)?;

    Ok(Json(User {
        id,
        username,
        created_at,
        last_login_at,
    }))
}
