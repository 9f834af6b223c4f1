use uuid::Uuid;

use super::{PageTree, TreeError};
use crate::models::{Breadcrumb, Node, NodeDocument};

/// Title and link of the synthetic first breadcrumb.
pub const HOME_TITLE: &str = "Home";
pub const HOME_URL: &str = "/index.html";

/// Public URL of a page with the given slug.
pub fn page_url(slug: &str) -> String {
    format!("/pages/{}.html", slug)
}

impl PageTree {
    /// Deep copy of the published part of the forest.
    ///
    /// Filtering is top-down: an unpublished node hides its whole subtree,
    /// whatever the flags of its descendants.
    pub fn project_published(&self) -> Vec<NodeDocument> {
        self.project(&self.roots)
    }

    fn project(&self, ids: &[Uuid]) -> Vec<NodeDocument> {
        ids.iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|entry| entry.node.published)
            .map(|entry| {
                let mut doc = NodeDocument::from_node(&entry.node);
                if entry.node.is_chapter() {
                    doc.children = Some(self.project(entry.node.children()));
                }
                doc
            })
            .collect()
    }

    /// Whether the node shows up in [`project_published`](Self::project_published):
    /// it and every ancestor are published.
    pub fn is_visible(&self, id: Uuid) -> Result<bool, TreeError> {
        let node = self.find_by_id(id)?;
        Ok(node.published && self.ancestors(id)?.iter().all(|n| n.published))
    }

    /// Breadcrumb trail for the page with `slug`: `Home`, each ancestor
    /// chapter from the root down, then the page itself as the active crumb.
    pub fn breadcrumbs(&self, slug: &str) -> Result<Vec<Breadcrumb>, TreeError> {
        let node = self.find_by_slug(slug)?;
        let mut trail = self.ancestors(node.id)?;
        trail.push(node);

        let mut crumbs = Vec::with_capacity(trail.len() + 1);
        crumbs.push(Breadcrumb {
            title: HOME_TITLE.to_string(),
            url: HOME_URL.to_string(),
            active: false,
        });
        crumbs.extend(trail.into_iter().map(|n| Breadcrumb {
            title: n.title.clone(),
            url: crumb_url(n),
            active: false,
        }));
        if let Some(last) = crumbs.last_mut() {
            last.active = true;
        }

        Ok(crumbs)
    }
}

fn crumb_url(node: &Node) -> String {
    node.slug().map(page_url).unwrap_or_else(|| "#".to_string())
}
