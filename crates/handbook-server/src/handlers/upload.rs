use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use handbook_shared::api::UploadResponse;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(limit)
    } else {
        AppError::Validation(err.body_text())
    }
}

/// POST /api/admin/upload
///
/// Expects the file in a multipart field named `file`.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.media.max_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        let file_path = state.media.store(file_name.as_deref(), &bytes).await?;
        tracing::info!("{} uploaded {}", user.username, file_path);

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file_path,
        }));
    }

    Err(AppError::Validation("No file part".to_string()))
}
