use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::{Breadcrumb, Design, Node};
use crate::tree::{NodePatch, OrderEntry, TreeError};

/// The admin panel sends `""` for "no parent".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub is_chapter: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Uuid>,
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
}

impl CreateNodeRequest {
    /// Validates the request and builds the node to insert under `parent_id`.
    pub fn into_node(self, id: Uuid) -> Result<Node, TreeError> {
        if self.title.trim().is_empty() {
            return Err(TreeError::InvalidState("Title is required".to_string()));
        }

        let slug = non_empty(self.slug);
        let content = non_empty(self.content);

        let node = if self.is_chapter {
            if slug.is_some() {
                return Err(TreeError::InvalidState(
                    "Chapters should not have slugs".to_string(),
                ));
            }
            if content.is_some() {
                return Err(TreeError::InvalidState(
                    "Chapters should not have content directly".to_string(),
                ));
            }
            Node::chapter(id, self.title)?
        } else {
            let slug = slug.ok_or_else(|| {
                TreeError::InvalidState("Slug is required for pages".to_string())
            })?;
            let content = content.ok_or_else(|| {
                TreeError::InvalidState("Content is required for pages".to_string())
            })?;
            Node::page(id, self.title, slug, content)?
        };

        Ok(Node {
            published: self.published,
            design: self.design,
            meta_description: non_empty(self.meta_description),
            meta_keywords: non_empty(self.meta_keywords),
            custom_css: non_empty(self.custom_css),
            placeholder_image: non_empty(self.placeholder_image),
            embedded_video: non_empty(self.embedded_video),
            ..node
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNodeResponse {
    pub message: String,
    pub page_id: Uuid,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateNodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_chapter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
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
}

impl From<UpdateNodeRequest> for NodePatch {
    fn from(req: UpdateNodeRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            content: req.content,
            published: req.published,
            is_chapter: req.is_chapter,
            design: req.design,
            meta_description: req.meta_description,
            meta_keywords: req.meta_keywords,
            custom_css: req.custom_css,
            placeholder_image: req.placeholder_image,
            embedded_video: req.embedded_video,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub published: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisibilityResponse {
    pub message: String,
    pub published: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DesignRequest {
    #[serde(rename = "headerColor", default, skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,
    #[serde(rename = "headerImage", default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
}

impl DesignRequest {
    /// Only the keys present in the request.
    pub fn into_design(self) -> Design {
        let mut design = Design::new();
        if let Some(color) = self.header_color {
            design.insert("headerColor".to_string(), color.into());
        }
        if let Some(image) = self.header_image {
            design.insert("headerImage".to_string(), image.into());
        }
        design
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DesignResponse {
    pub message: String,
    pub design: Design,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub sidebar_order: Vec<OrderEntry>,
}

/// Public rendering payload of a single page.
#[derive(Debug, Serialize, Deserialize)]
pub struct PagePayload {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Sanitized HTML.
    pub content: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default)]
    pub design: Design,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_video: Option<String>,
}
