use axum::{
    extract::{Path, State},
    Json,
};
use handbook_shared::{api::PagePayload, SidebarItem, TreeError};

use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/sidebar
pub async fn get_sidebar(
    State(state): State<AppState>,
) -> Result<Json<Vec<SidebarItem>>, AppError> {
    let tree = state.handbook.read().await?;

    let sidebar = tree
        .project_published()
        .iter()
        .map(SidebarItem::from)
        .collect();

    Ok(Json(sidebar))
}

/// GET /api/pages/:slug
///
/// Drafts, chapters and pages under an unpublished chapter are all 404.
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PagePayload>, AppError> {
    let tree = state.handbook.read().await?;

    let node = tree.find_by_slug(&slug)?;
    if !tree.is_visible(node.id)? {
        return Err(TreeError::NotFound.into());
    }
    let content = node.content().ok_or(TreeError::NotFound)?;
    let breadcrumbs = tree.breadcrumbs(&slug)?;

    Ok(Json(PagePayload {
        id: node.id,
        title: node.title.clone(),
        slug,
        content: state.sanitizer.clean(content),
        breadcrumbs,
        design: node.design.clone(),
        meta_description: node.meta_description.clone(),
        meta_keywords: node.meta_keywords.clone(),
        custom_css: node.custom_css.clone(),
        placeholder_image: node.placeholder_image.clone(),
        embedded_video: node.embedded_video.clone(),
    }))
}
