use axum::{extract::State, Json};
use handbook_shared::{is_setting_key, CmsSettings};
use serde_json::{Map, Value};

use crate::db::DbPool;
use crate::error::AppError;
use crate::routes::AppState;

/// Current values of the known settings; unset keys are `None`.
pub async fn load_settings(db: &DbPool) -> Result<CmsSettings, AppError> {
    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT setting_key, setting_value FROM settings")
            .fetch_all(db)
            .await?;

    Ok(CmsSettings::from_pairs(rows))
}

/// GET /api/admin/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<CmsSettings>, AppError> {
    Ok(Json(load_settings(&state.db).await?))
}

/// PUT /api/admin/settings
///
/// Only known keys are stored; `null` clears a setting.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<Map<String, Value>>,
) -> Result<Json<CmsSettings>, AppError> {
    let mut tx = state.db.begin().await?;

    for (key, value) in req {
        if !is_setting_key(&key) {
            tracing::warn!("Ignoring unknown setting '{}'", key);
            continue;
        }

        let value = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        };

        sqlx::query(
            r#"
            INSERT INTO settings (setting_key, setting_value)
            VALUES (?, ?)
            ON CONFLICT (setting_key) DO UPDATE SET setting_value = excluded.setting_value
            "#,
        )
        .bind(&key)
        .bind(&value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!("Settings updated");

    Ok(Json(load_settings(&state.db).await?))
}
