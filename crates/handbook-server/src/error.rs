use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use handbook_shared::TreeError;
use serde_json::json;

use crate::media::MediaError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upload exceeds {0} bytes")]
    TooLarge(usize),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::TooLarge(limit) => AppError::TooLarge(limit),
            MediaError::Empty => AppError::Validation("No selected file".to_string()),
            MediaError::Io(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::TooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::Tree(e) => match e {
                TreeError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                TreeError::InvalidParent => (StatusCode::BAD_REQUEST, e.to_string()),
                TreeError::DuplicateSlug(_) => (StatusCode::CONFLICT, e.to_string()),
                TreeError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            },
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        // Admin clients read `message`; API clients read `error`.
        let body = Json(json!({
            "error": message,
            "message": message
        }));

        (status, body).into_response()
    }
}
