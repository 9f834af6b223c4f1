use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use handbook_shared::{
    api::{CreateMenuRequest, MessageResponse, NamedResponse, UpdateMenuRequest},
    Menu,
};
use serde_json::Value;
use sqlx::types::Json as SqlJson;

use crate::error::AppError;
use crate::routes::AppState;

type MenuRow = (i64, String, SqlJson<Value>);

fn row_to_menu(row: MenuRow) -> Menu {
    Menu {
        id: row.0,
        name: row.1,
        menu_data: row.2 .0,
    }
}

async fn fetch_menu(state: &AppState, name: &str) -> Result<Menu, AppError> {
    let row: Option<MenuRow> =
        sqlx::query_as("SELECT id, name, menu_data FROM menus WHERE name = ?")
            .bind(name)
            .fetch_optional(&state.db)
            .await?;

    row.map(row_to_menu).ok_or(AppError::NotFound)
}

/// GET /api/admin/menus
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<Menu>>, AppError> {
    let rows: Vec<MenuRow> = sqlx::query_as("SELECT id, name, menu_data FROM menus ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(row_to_menu).collect()))
}

/// POST /api/admin/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Json(req): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<NamedResponse>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Menu name is required".to_string()));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM menus WHERE name = ?")
        .bind(name)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Menu with this name already exists".to_string(),
        ));
    }

    sqlx::query("INSERT INTO menus (name, menu_data) VALUES (?, ?)")
        .bind(name)
        .bind(SqlJson(&req.menu_data))
        .execute(&state.db)
        .await?;

    tracing::info!("Created menu '{}'", name);

    Ok((
        StatusCode::CREATED,
        Json(NamedResponse {
            message: "Menu created successfully".to_string(),
            name: name.to_string(),
        }),
    ))
}

/// GET /api/admin/menus/:name
pub async fn get_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Menu>, AppError> {
    Ok(Json(fetch_menu(&state, &name).await?))
}

/// PUT /api/admin/menus/:name
pub async fn update_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateMenuRequest>,
) -> Result<Json<Menu>, AppError> {
    let menu = fetch_menu(&state, &name).await?;

    if let Some(menu_data) = req.menu_data {
        sqlx::query("UPDATE menus SET menu_data = ? WHERE id = ?")
            .bind(SqlJson(&menu_data))
            .bind(menu.id)
            .execute(&state.db)
            .await?;
        tracing::info!("Updated menu '{}'", name);
    }

    Ok(Json(fetch_menu(&state, &name).await?))
}

/// DELETE /api/admin/menus/:name
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM menus WHERE name = ?")
        .bind(&name)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("Deleted menu '{}'", name);

    Ok(Json(MessageResponse::new("Menu deleted successfully")))
}
