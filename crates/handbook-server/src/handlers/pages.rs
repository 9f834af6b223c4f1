use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use handbook_shared::{
    api::{
        CreateNodeRequest, CreateNodeResponse, DesignRequest, DesignResponse, MessageResponse,
        ReorderRequest, UpdateNodeRequest, VisibilityRequest, VisibilityResponse,
    },
    NodeDocument,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/admin/pages
///
/// The whole tree, drafts included.
pub async fn list_pages(
    State(state): State<AppState>,
) -> Result<Json<Vec<NodeDocument>>, AppError> {
    let tree = state.handbook.read().await?;
    Ok(Json(tree.to_documents()))
}

/// POST /api/admin/pages
pub async fn create_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<CreateNodeResponse>), AppError> {
    let parent_id = req.parent_id;
    let node = req.into_node(Uuid::new_v4())?;
    let kind = if node.is_chapter() { "Chapter" } else { "Page" };

    let page_id = state
        .handbook
        .mutate(move |tree| tree.insert(node, parent_id))
        .await?;

    tracing::info!("{} created {} {}", user.username, kind.to_lowercase(), page_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateNodeResponse {
            message: format!("{} created successfully", kind),
            page_id,
        }),
    ))
}

/// GET /api/admin/pages/:id
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NodeDocument>, AppError> {
    let tree = state.handbook.read().await?;
    Ok(Json(tree.document(id)?))
}

/// PUT /api/admin/pages/:id
pub async fn update_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNodeRequest>,
) -> Result<Json<NodeDocument>, AppError> {
    let document = state
        .handbook
        .mutate(move |tree| {
            tree.update(id, req.into())?;
            tree.document(id)
        })
        .await?;

    tracing::info!("{} updated page {}", user.username, id);

    Ok(Json(document))
}

/// DELETE /api/admin/pages/:id
///
/// Removes the node together with everything below it.
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.handbook.mutate(move |tree| tree.remove(id)).await?;

    tracing::info!(
        "{} deleted page {} ({} node(s) removed)",
        user.username,
        id,
        removed.len()
    );

    Ok(Json(MessageResponse::new(format!(
        "Deleted {} page(s)",
        removed.len()
    ))))
}

/// PUT /api/admin/pages/:id/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<VisibilityRequest>,
) -> Result<Json<VisibilityResponse>, AppError> {
    let published = state
        .handbook
        .mutate(move |tree| tree.set_published(id, req.published).map(|node| node.published))
        .await?;

    tracing::info!("{} set page {} published={}", user.username, id, published);

    Ok(Json(VisibilityResponse {
        message: if published {
            "Page published".to_string()
        } else {
            "Page hidden".to_string()
        },
        published,
    }))
}

/// PUT /api/admin/pages/:id/design
pub async fn set_design(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<DesignRequest>,
) -> Result<Json<DesignResponse>, AppError> {
    let updates = req.into_design();
    let design = state
        .handbook
        .mutate(move |tree| tree.set_design(id, updates).cloned())
        .await?;

    tracing::info!("{} updated design of page {}", user.username, id);

    Ok(Json(DesignResponse {
        message: "Design updated successfully".to_string(),
        design,
    }))
}

/// PUT /api/admin/sidebar/reorder
pub async fn reorder_sidebar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .handbook
        .mutate(move |tree| tree.reorder(&req.sidebar_order))
        .await?;

    tracing::info!("{} reordered the sidebar", user.username);

    Ok(Json(MessageResponse::new("Sidebar order updated successfully")))
}
