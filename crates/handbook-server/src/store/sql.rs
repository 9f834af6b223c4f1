use std::collections::HashSet;

use handbook_shared::{Design, NodeRow, PageTree};
use sqlx::{types::Json, Executor, Sqlite};
use uuid::Uuid;

use crate::db::DbPool;

use super::StoreError;

type PageRow = (
    Uuid,                 // id
    Option<Uuid>,         // parent_id
    i64,                  // position
    String,               // title
    Option<String>,       // slug
    Option<String>,       // content
    bool,                 // published
    bool,                 // is_chapter
    Option<Json<Design>>, // design
    Option<String>,       // meta_description
    Option<String>,       // meta_keywords
    Option<String>,       // custom_css
    Option<String>,       // placeholder_image
    Option<String>,       // embedded_video
);

fn row_to_node_row(row: PageRow) -> NodeRow {
    NodeRow {
        id: row.0,
        parent_id: row.1,
        position: row.2,
        title: row.3,
        slug: row.4,
        content: row.5,
        published: row.6,
        is_chapter: row.7,
        design: row.8.map(|design| design.0).unwrap_or_default(),
        meta_description: row.9,
        meta_keywords: row.10,
        custom_css: row.11,
        placeholder_image: row.12,
        embedded_video: row.13,
    }
}

/// Flat `pages` table linked by `parent_id`.
#[derive(Debug, Clone)]
pub struct SqlPageStore {
    db: DbPool,
}

impl SqlPageStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn load_flat(&self) -> Result<Vec<NodeRow>, StoreError> {
        let rows: Vec<PageRow> = sqlx::query_as(
            r#"
            SELECT id, parent_id, position, title, slug, content, published, is_chapter,
                   design, meta_description, meta_keywords, custom_css,
                   placeholder_image, embedded_video
            FROM pages
            ORDER BY position
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(row_to_node_row).collect())
    }

    pub async fn load(&self) -> Result<PageTree, StoreError> {
        let rows = self.load_flat().await?;
        Ok(PageTree::from_rows(&rows)?)
    }

    /// Replaces the table contents with `tree` in one transaction.
    ///
    /// Rows missing from the tree are deleted first; the remaining rows are
    /// upserted in pre-order so every parent exists before its children.
    pub async fn save(&self, tree: &PageTree) -> Result<(), StoreError> {
        let rows = tree.to_rows();
        let keep: HashSet<Uuid> = rows.iter().map(|row| row.id).collect();

        let mut tx = self.db.begin().await?;

        let existing: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM pages")
            .fetch_all(&mut *tx)
            .await?;
        for (id,) in existing.into_iter().filter(|(id,)| !keep.contains(id)) {
            delete_row(&mut *tx, id).await?;
        }

        // Slugs are unique; clear them so renames within one save cannot collide.
        sqlx::query("UPDATE pages SET slug = NULL")
            .execute(&mut *tx)
            .await?;

        for row in &rows {
            upsert_row(&mut *tx, row).await?;
        }

        tx.commit().await?;
        tracing::debug!("Saved {} page row(s)", rows.len());
        Ok(())
    }
}

pub async fn upsert_row<'e, E>(executor: E, row: &NodeRow) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO pages (id, parent_id, position, title, slug, content, published,
                           is_chapter, design, meta_description, meta_keywords,
                           custom_css, placeholder_image, embedded_video)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            parent_id = excluded.parent_id,
            position = excluded.position,
            title = excluded.title,
            slug = excluded.slug,
            content = excluded.content,
            published = excluded.published,
            is_chapter = excluded.is_chapter,
            design = excluded.design,
            meta_description = excluded.meta_description,
            meta_keywords = excluded.meta_keywords,
            custom_css = excluded.custom_css,
            placeholder_image = excluded.placeholder_image,
            embedded_video = excluded.embedded_video
        "#,
    )
    .bind(row.id)
    .bind(row.parent_id)
    .bind(row.position)
    .bind(&row.title)
    .bind(&row.slug)
    .bind(&row.content)
    .bind(row.published)
    .bind(row.is_chapter)
    .bind(Json(&row.design))
    .bind(&row.meta_description)
    .bind(&row.meta_keywords)
    .bind(&row.custom_css)
    .bind(&row.placeholder_image)
    .bind(&row.embedded_video)
    .execute(executor)
    .await?;

    Ok(())
}

/// Deletes one row; descendants follow through `ON DELETE CASCADE`.
pub async fn delete_row<'e, E>(executor: E, id: Uuid) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM pages WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
