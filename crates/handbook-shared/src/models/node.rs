use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::tree::TreeError;

/// Free-form display options (`headerColor`, `headerImage`, media sizes, ...).
pub type Design = Map<String, Value>;

/// Structural role of a node in the handbook tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Container with ordered children and no content of its own.
    Chapter { children: Vec<Uuid> },
    /// Leaf addressed by slug.
    Page { slug: String, content: String },
}

/// A page or chapter of the handbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Uuid,
    pub title: String,
    pub kind: NodeKind,
    pub published: bool,
    pub design: Design,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub custom_css: Option<String>,
    pub placeholder_image: Option<String>,
    pub embedded_video: Option<String>,
}

impl Node {
    /// New, empty chapter.
    pub fn chapter(id: Uuid, title: impl Into<String>) -> Result<Self, TreeError> {
        let node = Self::bare(id, title.into(), NodeKind::Chapter { children: Vec::new() });
        node.validate()?;
        Ok(node)
    }

    /// New page with the given slug and HTML content.
    pub fn page(
        id: Uuid,
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, TreeError> {
        let node = Self::bare(
            id,
            title.into(),
            NodeKind::Page {
                slug: slug.into(),
                content: content.into(),
            },
        );
        node.validate()?;
        Ok(node)
    }

    fn bare(id: Uuid, title: String, kind: NodeKind) -> Self {
        Self {
            id,
            title,
            kind,
            published: false,
            design: Design::new(),
            meta_description: None,
            meta_keywords: None,
            custom_css: None,
            placeholder_image: None,
            embedded_video: None,
        }
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn is_chapter(&self) -> bool {
        matches!(self.kind, NodeKind::Chapter { .. })
    }

    pub fn slug(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Page { slug, .. } => Some(slug),
            NodeKind::Chapter { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Page { content, .. } => Some(content),
            NodeKind::Chapter { .. } => None,
        }
    }

    /// Ordered child ids; empty for pages.
    pub fn children(&self) -> &[Uuid] {
        match &self.kind {
            NodeKind::Chapter { children } => children,
            NodeKind::Page { .. } => &[],
        }
    }

    /// Checks the field-level invariants that do not depend on the rest of the tree.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.title.trim().is_empty() {
            return Err(TreeError::InvalidState("title is required".to_string()));
        }

        if let NodeKind::Page { slug, content } = &self.kind {
            if !is_valid_slug(slug) {
                return Err(TreeError::InvalidState(format!("invalid slug '{}'", slug)));
            }
            if content.trim().is_empty() {
                return Err(TreeError::InvalidState("pages require content".to_string()));
            }
        }

        Ok(())
    }
}

/// Slugs are URL path segments: ASCII alphanumerics plus `-` and `_`,
/// starting with an alphanumeric.
pub fn is_valid_slug(slug: &str) -> bool {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

/// Nested wire and persistence shape of a node.
///
/// Documents written before `is_chapter` was stored mark chapters only by
/// the presence of `children`, so both are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub is_chapter: bool,
    #[serde(default)]
    pub design: Design,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub placeholder_image: Option<String>,
    #[serde(default, alias = "video", skip_serializing_if = "Option::is_none")]
    pub embedded_video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeDocument>>,
}

impl NodeDocument {
    /// Document for `node` without its children; chapters get an empty list.
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            slug: node.slug().map(str::to_string),
            content: node.content().map(str::to_string),
            published: node.published,
            is_chapter: node.is_chapter(),
            design: node.design.clone(),
            meta_description: node.meta_description.clone(),
            meta_keywords: node.meta_keywords.clone(),
            custom_css: node.custom_css.clone(),
            placeholder_image: node.placeholder_image.clone(),
            embedded_video: node.embedded_video.clone(),
            children: node.is_chapter().then(Vec::new),
        }
    }

    /// Older documents mark chapters only by carrying `children`. An empty
    /// list next to a slug or content still describes a page.
    pub fn is_chapter(&self) -> bool {
        self.is_chapter
            || self
                .children
                .as_ref()
                .is_some_and(|children| !children.is_empty() || !self.has_page_fields())
    }

    fn has_page_fields(&self) -> bool {
        has_text(&self.slug) || has_text(&self.content)
    }

    /// Converts the document's own fields into a validated node, ignoring children.
    pub fn to_node(&self) -> Result<Node, TreeError> {
        let kind = if self.is_chapter() {
            if self.has_page_fields() {
                return Err(TreeError::InvalidState(format!(
                    "chapter {} has a slug or content",
                    self.id
                )));
            }
            NodeKind::Chapter { children: Vec::new() }
        } else {
            NodeKind::Page {
                slug: self.slug.clone().ok_or_else(|| {
                    TreeError::InvalidState(format!("page {} has no slug", self.id))
                })?,
                content: self.content.clone().unwrap_or_default(),
            }
        };

        let node = Node {
            id: self.id,
            title: self.title.clone(),
            kind,
            published: self.published,
            design: self.design.clone(),
            meta_description: self.meta_description.clone(),
            meta_keywords: self.meta_keywords.clone(),
            custom_css: self.custom_css.clone(),
            placeholder_image: self.placeholder_image.clone(),
            embedded_video: self.embedded_video.clone(),
        };
        node.validate()?;
        Ok(node)
    }
}

/// Flat row shape used by the relational store.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    /// Position among siblings, starting at zero.
    pub position: i64,
    pub title: String,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub published: bool,
    pub is_chapter: bool,
    pub design: Design,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub custom_css: Option<String>,
    pub placeholder_image: Option<String>,
    pub embedded_video: Option<String>,
}

impl NodeRow {
    pub fn from_node(node: &Node, parent_id: Option<Uuid>, position: i64) -> Self {
        Self {
            id: node.id,
            parent_id,
            position,
            title: node.title.clone(),
            slug: node.slug().map(str::to_string),
            content: node.content().map(str::to_string),
            published: node.published,
            is_chapter: node.is_chapter(),
            design: node.design.clone(),
            meta_description: node.meta_description.clone(),
            meta_keywords: node.meta_keywords.clone(),
            custom_css: node.custom_css.clone(),
            placeholder_image: node.placeholder_image.clone(),
            embedded_video: node.embedded_video.clone(),
        }
    }

    pub fn to_node(&self) -> Result<Node, TreeError> {
        let kind = if self.is_chapter {
            if has_text(&self.slug) || has_text(&self.content) {
                return Err(TreeError::InvalidState(format!(
                    "chapter {} has a slug or content",
                    self.id
                )));
            }
            NodeKind::Chapter { children: Vec::new() }
        } else {
            NodeKind::Page {
                slug: self.slug.clone().ok_or_else(|| {
                    TreeError::InvalidState(format!("page {} has no slug", self.id))
                })?,
                content: self.content.clone().unwrap_or_default(),
            }
        };

        let node = Node {
            id: self.id,
            title: self.title.clone(),
            kind,
            published: self.published,
            design: self.design.clone(),
            meta_description: self.meta_description.clone(),
            meta_keywords: self.meta_keywords.clone(),
            custom_css: self.custom_css.clone(),
            placeholder_image: self.placeholder_image.clone(),
            embedded_video: self.embedded_video.clone(),
        };
        node.validate()?;
        Ok(node)
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.is_empty())
}

/// Navigation entry of the public sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub is_chapter: bool,
    #[serde(default)]
    pub design: Design,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SidebarItem>,
}

impl From<&NodeDocument> for SidebarItem {
    fn from(doc: &NodeDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            is_chapter: doc.is_chapter(),
            design: doc.design.clone(),
            children: doc
                .children
                .iter()
                .flatten()
                .map(SidebarItem::from)
                .collect(),
        }
    }
}

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub title: String,
    pub url: String,
    /// The current page; rendered as plain text rather than a link.
    #[serde(default)]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("housing"));
        assert!(is_valid_slug("our-company_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("a/b"));
    }

    #[test]
    fn test_page_requires_title_and_content() {
        assert!(Node::page(Uuid::new_v4(), "  ", "x", "<p>x</p>").is_err());
        assert!(Node::page(Uuid::new_v4(), "X", "x", "").is_err());
        assert!(Node::page(Uuid::new_v4(), "X", "x", "<p>x</p>").is_ok());
    }

    #[test]
    fn test_legacy_document_without_is_chapter() {
        let doc: NodeDocument = serde_json::from_value(json!({
            "id": "6f1f2b1e-4c4f-4d59-9a3c-0c3f44c5b5a1",
            "title": "Benefits",
            "slug": null,
            "content": null,
            "published": true,
            "design": {},
            "children": []
        }))
        .unwrap();

        assert!(doc.is_chapter());
        let node = doc.to_node().unwrap();
        assert!(node.is_chapter());
        assert_eq!(node.slug(), None);
    }

    #[test]
    fn test_document_accepts_legacy_media_keys() {
        let doc: NodeDocument = serde_json::from_value(json!({
            "id": "6f1f2b1e-4c4f-4d59-9a3c-0c3f44c5b5a1",
            "title": "Housing",
            "slug": "housing",
            "content": "<p>Rooms</p>",
            "image": "/uploads/a.png",
            "video": "https://example.com/v"
        }))
        .unwrap();

        assert_eq!(doc.placeholder_image.as_deref(), Some("/uploads/a.png"));
        assert_eq!(doc.embedded_video.as_deref(), Some("https://example.com/v"));
        assert!(!doc.published);
    }

    #[test]
    fn test_document_with_empty_children_and_slug_is_page() {
        let doc: NodeDocument = serde_json::from_value(json!({
            "id": "6f1f2b1e-4c4f-4d59-9a3c-0c3f44c5b5a1",
            "title": "Housing",
            "slug": "housing",
            "content": "<p>Rooms</p>",
            "children": []
        }))
        .unwrap();

        assert!(!doc.is_chapter());
        let node = doc.to_node().unwrap();
        assert_eq!(node.slug(), Some("housing"));
        assert_eq!(node.content(), Some("<p>Rooms</p>"));
    }

    #[test]
    fn test_chapter_document_with_page_fields_is_rejected() {
        let with_children: NodeDocument = serde_json::from_value(json!({
            "id": "6f1f2b1e-4c4f-4d59-9a3c-0c3f44c5b5a1",
            "title": "Housing",
            "slug": "housing",
            "content": "<p>Rooms</p>",
            "children": [{
                "id": "0b6c1a43-32a1-4a0e-8f5e-2d9b1f7d8c11",
                "title": "Rooms",
                "slug": "rooms",
                "content": "<p>Beds</p>"
            }]
        }))
        .unwrap();
        let flagged: NodeDocument = serde_json::from_value(json!({
            "id": "6f1f2b1e-4c4f-4d59-9a3c-0c3f44c5b5a1",
            "title": "Housing",
            "slug": "housing",
            "is_chapter": true
        }))
        .unwrap();

        assert!(matches!(with_children.to_node(), Err(TreeError::InvalidState(_))));
        assert!(matches!(flagged.to_node(), Err(TreeError::InvalidState(_))));
    }

    #[test]
    fn test_row_chapter_with_page_fields_is_rejected() {
        let mut row = NodeRow::from_node(
            &Node::chapter(Uuid::new_v4(), "Benefits").unwrap(),
            None,
            0,
        );
        row.content = Some("<p>Stale</p>".to_string());
        assert!(matches!(row.to_node(), Err(TreeError::InvalidState(_))));

        row.content = None;
        row.slug = Some("benefits".to_string());
        assert!(matches!(row.to_node(), Err(TreeError::InvalidState(_))));
    }

    #[test]
    fn test_row_page_without_slug_is_rejected() {
        let mut row = NodeRow::from_node(
            &Node::page(Uuid::new_v4(), "Housing", "housing", "<p>x</p>").unwrap(),
            None,
            0,
        );
        row.slug = None;
        assert!(matches!(row.to_node(), Err(TreeError::InvalidState(_))));
    }
}
