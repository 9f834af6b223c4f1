use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use handbook_shared::{
    api::{CreateWidgetRequest, MessageResponse, NamedResponse, UpdateWidgetRequest},
    Widget,
};
use serde_json::Value;
use sqlx::types::Json as SqlJson;

use crate::error::AppError;
use crate::routes::AppState;

type WidgetRow = (i64, String, String, SqlJson<Value>);

fn row_to_widget(row: WidgetRow) -> Widget {
    Widget {
        id: row.0,
        name: row.1,
        widget_type: row.2,
        widget_data: row.3 .0,
    }
}

async fn fetch_widget(state: &AppState, name: &str) -> Result<Widget, AppError> {
    let row: Option<WidgetRow> = sqlx::query_as(
        "SELECT id, name, widget_type, widget_data FROM widgets WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&state.db)
    .await?;

    row.map(row_to_widget).ok_or(AppError::NotFound)
}

/// GET /api/admin/widgets
pub async fn list_widgets(
    State(state): State<AppState>,
) -> Result<Json<Vec<Widget>>, AppError> {
    let rows: Vec<WidgetRow> = sqlx::query_as(
        "SELECT id, name, widget_type, widget_data FROM widgets ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(row_to_widget).collect()))
}

/// POST /api/admin/widgets
pub async fn create_widget(
    State(state): State<AppState>,
    Json(req): Json<CreateWidgetRequest>,
) -> Result<(StatusCode, Json<NamedResponse>), AppError> {
    let name = req.name.trim();
    if name.is_empty() || req.widget_type.trim().is_empty() {
        return Err(AppError::Validation(
            "Widget name and type are required".to_string(),
        ));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM widgets WHERE name = ?")
        .bind(name)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Widget with this name already exists".to_string(),
        ));
    }

    sqlx::query("INSERT INTO widgets (name, widget_type, widget_data) VALUES (?, ?, ?)")
        .bind(name)
        .bind(req.widget_type.trim())
        .bind(SqlJson(&req.widget_data))
        .execute(&state.db)
        .await?;

    tracing::info!("Created {} widget '{}'", req.widget_type.trim(), name);

    Ok((
        StatusCode::CREATED,
        Json(NamedResponse {
            message: "Widget created successfully".to_string(),
            name: name.to_string(),
        }),
    ))
}

/// GET /api/admin/widgets/:name
pub async fn get_widget(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Widget>, AppError> {
    Ok(Json(fetch_widget(&state, &name).await?))
}

/// PUT /api/admin/widgets/:name
pub async fn update_widget(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateWidgetRequest>,
) -> Result<Json<Widget>, AppError> {
    let widget = fetch_widget(&state, &name).await?;

    let widget_type = match req.widget_type {
        Some(t) if t.trim().is_empty() => {
            return Err(AppError::Validation("Widget type cannot be empty".to_string()))
        }
        Some(t) => t.trim().to_string(),
        None => widget.widget_type,
    };
    let widget_data = req.widget_data.unwrap_or(widget.widget_data);

    sqlx::query("UPDATE widgets SET widget_type = ?, widget_data = ? WHERE id = ?")
        .bind(&widget_type)
        .bind(SqlJson(&widget_data))
        .bind(widget.id)
        .execute(&state.db)
        .await?;

    tracing::info!("Updated widget '{}'", name);

    Ok(Json(Widget {
        id: widget.id,
        name: widget.name,
        widget_type,
        widget_data,
    }))
}

/// DELETE /api/admin/widgets/:name
pub async fn delete_widget(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM widgets WHERE name = ?")
        .bind(&name)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("Deleted widget '{}'", name);

    Ok(Json(MessageResponse::new("Widget deleted successfully")))
}
