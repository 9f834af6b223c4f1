//! Handbook page tree.
//!
//! The handbook is a forest of chapters and pages. [`PageTree`] keeps every
//! node in an id-keyed arena with a parent link, the ordered list of root
//! ids, and a slug index, so lookups by id or slug are O(1) and structural
//! operations never need to search the nesting.
//!
//! Child order lives in [`NodeKind::Chapter`]; a node's parent link is kept
//! in sync with it by every mutation. All mutating operations validate
//! before they touch the arena, so a failed call leaves the tree unchanged.

mod convert;
mod projection;
mod reorder;

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{is_valid_slug, Design, Node, NodeKind};

pub use projection::{page_url, HOME_TITLE, HOME_URL};
pub use reorder::OrderEntry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Node not found")]
    NotFound,

    #[error("Parent not found or is not a chapter")]
    InvalidParent,

    #[error("Slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Invalid node: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    node: Node,
    parent: Option<Uuid>,
}

/// Fields to merge into an existing node. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub is_chapter: Option<bool>,
    pub design: Option<Design>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub custom_css: Option<String>,
    pub placeholder_image: Option<String>,
    pub embedded_video: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTree {
    entries: HashMap<Uuid, Entry>,
    roots: Vec<Uuid>,
    slugs: HashMap<String, Uuid>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the root-level nodes, in order.
    pub fn roots(&self) -> &[Uuid] {
        &self.roots
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<&Node, TreeError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.node)
            .ok_or(TreeError::NotFound)
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<&Node, TreeError> {
        let id = self.slugs.get(slug).ok_or(TreeError::NotFound)?;
        self.find_by_id(*id)
    }

    /// Containing chapter of `id`, or `None` for a root-level node.
    pub fn find_parent(&self, id: Uuid) -> Result<Option<&Node>, TreeError> {
        let entry = self.entries.get(&id).ok_or(TreeError::NotFound)?;
        Ok(entry
            .parent
            .and_then(|parent| self.entries.get(&parent))
            .map(|parent| &parent.node))
    }

    /// Ancestors of `id` from the root down, not including `id` itself.
    pub fn ancestors(&self, id: Uuid) -> Result<Vec<&Node>, TreeError> {
        let mut current = self.entries.get(&id).ok_or(TreeError::NotFound)?.parent;
        let mut chain = Vec::new();
        while let Some(parent_id) = current {
            let Some(parent) = self.entries.get(&parent_id) else {
                break;
            };
            chain.push(&parent.node);
            current = parent.parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Adds `node` as the last child of `parent`, or as the last root when
    /// `parent` is `None`. Returns the id of the inserted node.
    pub fn insert(&mut self, node: Node, parent: Option<Uuid>) -> Result<Uuid, TreeError> {
        node.validate()?;

        if self.entries.contains_key(&node.id) {
            return Err(TreeError::InvalidState(format!(
                "node {} already exists",
                node.id
            )));
        }
        if !node.children().is_empty() {
            return Err(TreeError::InvalidState(
                "new chapters must start without children".to_string(),
            ));
        }
        if let Some(slug) = node.slug() {
            if self.slugs.contains_key(slug) {
                return Err(TreeError::DuplicateSlug(slug.to_string()));
            }
        }
        if let Some(parent_id) = parent {
            match self.entries.get(&parent_id) {
                Some(entry) if entry.node.is_chapter() => {}
                _ => return Err(TreeError::InvalidParent),
            }
        }

        let id = node.id;
        match parent.and_then(|parent_id| self.entries.get_mut(&parent_id)) {
            Some(Entry {
                node:
                    Node {
                        kind: NodeKind::Chapter { children },
                        ..
                    },
                ..
            }) => children.push(id),
            _ => self.roots.push(id),
        }
        if let Some(slug) = node.slug() {
            self.slugs.insert(slug.to_string(), id);
        }
        self.entries.insert(id, Entry { node, parent });

        Ok(id)
    }

    /// Merges `patch` into the node, keeping its id and position.
    ///
    /// Turning a page into a chapter drops its slug and content and gives it
    /// an empty child list. Turning a chapter into a page removes its whole
    /// former subtree.
    pub fn update(&mut self, id: Uuid, patch: NodePatch) -> Result<&Node, TreeError> {
        let current = &self.entries.get(&id).ok_or(TreeError::NotFound)?.node;
        let to_chapter = patch.is_chapter.unwrap_or(current.is_chapter());

        let kind = if to_chapter {
            let has_slug = patch.slug.as_deref().is_some_and(|s| !s.is_empty());
            let has_content = patch.content.as_deref().is_some_and(|c| !c.is_empty());
            if has_slug || has_content {
                return Err(TreeError::InvalidState(
                    "chapters cannot have a slug or content".to_string(),
                ));
            }
            match &current.kind {
                NodeKind::Chapter { children } => NodeKind::Chapter {
                    children: children.clone(),
                },
                NodeKind::Page { .. } => NodeKind::Chapter {
                    children: Vec::new(),
                },
            }
        } else {
            let slug = patch
                .slug
                .clone()
                .or_else(|| current.slug().map(str::to_string))
                .ok_or_else(|| TreeError::InvalidState("pages require a slug".to_string()))?;
            let content = patch
                .content
                .clone()
                .or_else(|| current.content().map(str::to_string))
                .ok_or_else(|| TreeError::InvalidState("pages require content".to_string()))?;

            if !is_valid_slug(&slug) {
                return Err(TreeError::InvalidState(format!("invalid slug '{}'", slug)));
            }
            // The former subtree of a chapter is dropped by this update, so
            // its slugs are free to take.
            let dropped = if current.is_chapter() {
                self.subtree_ids(id)
            } else {
                vec![id]
            };
            if self.slugs.get(&slug).is_some_and(|owner| !dropped.contains(owner)) {
                return Err(TreeError::DuplicateSlug(slug));
            }
            NodeKind::Page { slug, content }
        };

        let mut updated = current.clone();
        updated.kind = kind;
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(published) = patch.published {
            updated.published = published;
        }
        if let Some(design) = patch.design {
            updated.design = design;
        }
        apply_text(&mut updated.meta_description, patch.meta_description);
        apply_text(&mut updated.meta_keywords, patch.meta_keywords);
        apply_text(&mut updated.custom_css, patch.custom_css);
        apply_text(&mut updated.placeholder_image, patch.placeholder_image);
        apply_text(&mut updated.embedded_video, patch.embedded_video);
        updated.validate()?;

        // Validation done; commit.
        let old_slug = current.slug().map(str::to_string);
        let orphaned: Vec<Uuid> = if updated.is_chapter() {
            Vec::new()
        } else {
            current.children().to_vec()
        };
        for child in orphaned {
            self.remove_subtree(child);
        }
        if let Some(old_slug) = old_slug {
            self.slugs.remove(&old_slug);
        }
        if let Some(slug) = updated.slug() {
            self.slugs.insert(slug.to_string(), id);
        }

        let entry = self.entries.get_mut(&id).ok_or(TreeError::NotFound)?;
        entry.node = updated;
        Ok(&entry.node)
    }

    /// Removes the node and its entire subtree. Returns the removed nodes in
    /// pre-order.
    pub fn remove(&mut self, id: Uuid) -> Result<Vec<Node>, TreeError> {
        let parent = self.entries.get(&id).ok_or(TreeError::NotFound)?.parent;

        match parent.and_then(|parent_id| self.entries.get_mut(&parent_id)) {
            Some(Entry {
                node:
                    Node {
                        kind: NodeKind::Chapter { children },
                        ..
                    },
                ..
            }) => children.retain(|child| *child != id),
            _ => self.roots.retain(|root| *root != id),
        }

        Ok(self.remove_subtree(id))
    }

    /// Drops `id` and its descendants from the arena. The caller detaches
    /// `id` from its container.
    fn remove_subtree(&mut self, id: Uuid) -> Vec<Node> {
        let ids = self.subtree_ids(id);
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entry) = self.entries.remove(&id) {
                if let Some(slug) = entry.node.slug() {
                    self.slugs.remove(slug);
                }
                removed.push(entry.node);
            }
        }
        removed
    }

    /// `id` followed by all its descendants, pre-order.
    fn subtree_ids(&self, id: Uuid) -> Vec<Uuid> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.entries.get(&current) {
                ids.push(current);
                stack.extend(entry.node.children().iter().rev());
            }
        }
        ids
    }

    /// Sets the node's own visibility flag. Descendants keep theirs.
    pub fn set_published(&mut self, id: Uuid, published: bool) -> Result<&Node, TreeError> {
        let entry = self.entries.get_mut(&id).ok_or(TreeError::NotFound)?;
        entry.node.published = published;
        Ok(&entry.node)
    }

    /// Merges `updates` into the node's design options, key by key.
    pub fn set_design(&mut self, id: Uuid, updates: Design) -> Result<&Design, TreeError> {
        let entry = self.entries.get_mut(&id).ok_or(TreeError::NotFound)?;
        entry.node.design.extend(updates);
        Ok(&entry.node.design)
    }

    /// Every node in pre-order: a node before its children, siblings in order.
    pub fn flatten(&self) -> Vec<&Node> {
        let mut nodes = Vec::with_capacity(self.entries.len());
        for root in &self.roots {
            for id in self.subtree_ids(*root) {
                if let Some(entry) = self.entries.get(&id) {
                    nodes.push(&entry.node);
                }
            }
        }
        nodes
    }

    /// Flattened nodes paired with their parent id and sibling position.
    pub fn walk(&self) -> Vec<(&Node, Option<Uuid>, usize)> {
        self.flatten()
            .into_iter()
            .map(|node| {
                let parent = self.entries.get(&node.id).and_then(|entry| entry.parent);
                let siblings = match parent.and_then(|p| self.entries.get(&p)) {
                    Some(entry) => entry.node.children(),
                    None => &self.roots,
                };
                let position = siblings.iter().position(|s| *s == node.id).unwrap_or(0);
                (node, parent, position)
            })
            .collect()
    }
}

fn apply_text(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *field = if value.is_empty() { None } else { Some(value) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(title: &str, slug: &str) -> Node {
        Node::page(Uuid::new_v4(), title, slug, format!("<p>{}</p>", title)).unwrap()
    }

    fn chapter(title: &str) -> Node {
        Node::chapter(Uuid::new_v4(), title).unwrap()
    }

    #[test]
    fn test_insert_then_find_returns_equal_node() {
        let mut tree = PageTree::new();
        let node = page("Welcome", "welcome").with_published(true);

        let id = tree.insert(node.clone(), None).unwrap();

        assert_eq!(tree.find_by_id(id).unwrap(), &node);
        assert_eq!(tree.find_by_slug("welcome").unwrap().id, id);
    }

    #[test]
    fn test_insert_nested_is_found_exhaustively() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let b = tree.insert(chapter("B"), Some(a)).unwrap();
        let c = tree.insert(page("C", "c"), Some(b)).unwrap();

        assert_eq!(tree.find_by_id(c).unwrap().title, "C");
        assert_eq!(tree.find_parent(c).unwrap().unwrap().id, b);
        assert_eq!(tree.find_parent(a).unwrap(), None);
        assert_eq!(tree.find_parent(Uuid::new_v4()), Err(TreeError::NotFound));
    }

    #[test]
    fn test_insert_duplicate_slug_leaves_tree_unchanged() {
        let mut tree = PageTree::new();
        let ch = tree.insert(chapter("Benefits"), None).unwrap();
        tree.insert(page("Housing", "housing"), Some(ch)).unwrap();
        let before = tree.clone();

        let result = tree.insert(page("Other housing", "housing"), None);

        assert_eq!(result, Err(TreeError::DuplicateSlug("housing".to_string())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_under_page_or_missing_parent_fails() {
        let mut tree = PageTree::new();
        let p = tree.insert(page("Housing", "housing"), None).unwrap();

        assert_eq!(
            tree.insert(page("Rooms", "rooms"), Some(p)),
            Err(TreeError::InvalidParent)
        );
        assert_eq!(
            tree.insert(page("Rooms", "rooms"), Some(Uuid::new_v4())),
            Err(TreeError::InvalidParent)
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_existing_id_fails() {
        let mut tree = PageTree::new();
        let node = chapter("A");
        tree.insert(node.clone(), None).unwrap();

        assert!(matches!(
            tree.insert(node, None),
            Err(TreeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_flatten_is_preorder_and_complete() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let a1 = tree.insert(page("A1", "a1"), Some(a)).unwrap();
        let a2 = tree.insert(chapter("A2"), Some(a)).unwrap();
        let a2x = tree.insert(page("A2x", "a2x"), Some(a2)).unwrap();
        let b = tree.insert(page("B", "b"), None).unwrap();
        let a3 = tree.insert(page("A3", "a3"), Some(a)).unwrap();

        let ids: Vec<Uuid> = tree.flatten().iter().map(|n| n.id).collect();

        assert_eq!(ids, vec![a, a1, a2, a2x, a3, b]);
    }

    #[test]
    fn test_walk_reports_parent_and_position() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let a1 = tree.insert(page("A1", "a1"), Some(a)).unwrap();
        let a2 = tree.insert(page("A2", "a2"), Some(a)).unwrap();
        let b = tree.insert(page("B", "b"), None).unwrap();

        let walked: Vec<(Uuid, Option<Uuid>, usize)> = tree
            .walk()
            .into_iter()
            .map(|(node, parent, position)| (node.id, parent, position))
            .collect();

        assert_eq!(
            walked,
            vec![(a, None, 0), (a1, Some(a), 0), (a2, Some(a), 1), (b, None, 1)]
        );
    }

    #[test]
    fn test_remove_chapter_removes_descendants() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let b = tree.insert(chapter("B"), Some(a)).unwrap();
        let c = tree.insert(page("C", "c"), Some(b)).unwrap();
        let d = tree.insert(page("D", "d"), None).unwrap();

        let removed = tree.remove(a).unwrap();

        let removed_ids: Vec<Uuid> = removed.iter().map(|n| n.id).collect();
        assert_eq!(removed_ids, vec![a, b, c]);
        for id in [a, b, c] {
            assert_eq!(tree.find_by_id(id), Err(TreeError::NotFound));
        }
        assert_eq!(tree.find_by_slug("c"), Err(TreeError::NotFound));
        assert_eq!(tree.roots(), &[d]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_nested_detaches_from_parent() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let a1 = tree.insert(page("A1", "a1"), Some(a)).unwrap();
        let a2 = tree.insert(page("A2", "a2"), Some(a)).unwrap();

        tree.remove(a1).unwrap();

        assert_eq!(tree.find_by_id(a).unwrap().children(), &[a2]);
        assert_eq!(tree.remove(a1), Err(TreeError::NotFound));
    }

    #[test]
    fn test_benefits_housing_scenario() {
        let mut tree = PageTree::new();
        let benefits = tree.insert(chapter("Benefits"), None).unwrap();
        tree.insert(page("Housing", "housing"), Some(benefits))
            .unwrap();

        let housing = tree.find_by_slug("housing").unwrap();
        assert_eq!(tree.find_parent(housing.id).unwrap().unwrap().id, benefits);

        tree.remove(benefits).unwrap();

        assert_eq!(tree.find_by_slug("housing"), Err(TreeError::NotFound));
    }

    #[test]
    fn test_update_page_to_chapter_clears_slug_and_content() {
        let mut tree = PageTree::new();
        let id = tree.insert(page("Housing", "housing"), None).unwrap();

        let patch = NodePatch {
            is_chapter: Some(true),
            ..Default::default()
        };
        let node = tree.update(id, patch).unwrap();

        assert_eq!(node.kind, NodeKind::Chapter { children: vec![] });
        assert_eq!(node.slug(), None);
        assert_eq!(node.content(), None);
        assert_eq!(tree.find_by_slug("housing"), Err(TreeError::NotFound));
    }

    #[test]
    fn test_update_chapter_to_page_drops_children() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let child = tree.insert(page("Child", "child"), Some(a)).unwrap();

        let patch = NodePatch {
            is_chapter: Some(false),
            slug: Some("a".to_string()),
            content: Some("<p>A</p>".to_string()),
            ..Default::default()
        };
        tree.update(a, patch).unwrap();

        assert_eq!(tree.find_by_id(child), Err(TreeError::NotFound));
        assert_eq!(tree.find_by_slug("child"), Err(TreeError::NotFound));
        assert_eq!(tree.find_by_slug("a").unwrap().id, a);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_update_chapter_to_page_takes_slug_of_dropped_child() {
        let mut tree = PageTree::new();
        let intro = tree.insert(chapter("Intro"), None).unwrap();
        let child = tree.insert(page("Intro page", "intro"), Some(intro)).unwrap();

        let patch = NodePatch {
            is_chapter: Some(false),
            slug: Some("intro".to_string()),
            content: Some("<p>Intro</p>".to_string()),
            ..Default::default()
        };
        tree.update(intro, patch).unwrap();

        assert_eq!(tree.find_by_id(child), Err(TreeError::NotFound));
        assert_eq!(tree.find_by_slug("intro").unwrap().id, intro);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_update_chapter_to_page_with_slug_outside_subtree_fails() {
        let mut tree = PageTree::new();
        let intro = tree.insert(chapter("Intro"), None).unwrap();
        tree.insert(page("Child", "child"), Some(intro)).unwrap();
        tree.insert(page("Welcome", "welcome"), None).unwrap();
        let before = tree.clone();

        let patch = NodePatch {
            is_chapter: Some(false),
            slug: Some("welcome".to_string()),
            content: Some("<p>Intro</p>".to_string()),
            ..Default::default()
        };

        assert_eq!(
            tree.update(intro, patch).map(|node| node.id),
            Err(TreeError::DuplicateSlug("welcome".to_string()))
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_update_chapter_to_page_without_slug_fails() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        tree.insert(page("Child", "child"), Some(a)).unwrap();
        let before = tree.clone();

        let patch = NodePatch {
            is_chapter: Some(false),
            ..Default::default()
        };

        assert!(matches!(
            tree.update(a, patch),
            Err(TreeError::InvalidState(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_update_rename_slug_keeps_position() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();
        let first = tree.insert(page("First", "first"), Some(a)).unwrap();
        let second = tree.insert(page("Second", "second"), Some(a)).unwrap();

        let patch = NodePatch {
            slug: Some("renamed".to_string()),
            title: Some("First, renamed".to_string()),
            ..Default::default()
        };
        tree.update(first, patch).unwrap();

        assert_eq!(tree.find_by_id(a).unwrap().children(), &[first, second]);
        assert_eq!(tree.find_by_slug("renamed").unwrap().id, first);
        assert_eq!(tree.find_by_slug("first"), Err(TreeError::NotFound));
    }

    #[test]
    fn test_update_rename_to_taken_slug_fails() {
        let mut tree = PageTree::new();
        let first = tree.insert(page("First", "first"), None).unwrap();
        tree.insert(page("Second", "second"), None).unwrap();

        let patch = NodePatch {
            slug: Some("second".to_string()),
            ..Default::default()
        };

        assert_eq!(
            tree.update(first, patch),
            Err(TreeError::DuplicateSlug("second".to_string()))
        );
    }

    #[test]
    fn test_update_chapter_with_content_is_invalid() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A"), None).unwrap();

        let patch = NodePatch {
            content: Some("<p>no</p>".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            tree.update(a, patch),
            Err(TreeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_update_missing_node_fails() {
        let mut tree = PageTree::new();
        assert_eq!(
            tree.update(Uuid::new_v4(), NodePatch::default()),
            Err(TreeError::NotFound)
        );
    }

    #[test]
    fn test_set_published_does_not_cascade() {
        let mut tree = PageTree::new();
        let a = tree.insert(chapter("A").with_published(true), None).unwrap();
        let c = tree
            .insert(page("C", "c").with_published(true), Some(a))
            .unwrap();

        tree.set_published(a, false).unwrap();

        assert!(!tree.find_by_id(a).unwrap().published);
        assert!(tree.find_by_id(c).unwrap().published);
    }

    #[test]
    fn test_set_design_merges_keys() {
        let mut tree = PageTree::new();
        let id = tree.insert(page("C", "c"), None).unwrap();

        let mut first = Design::new();
        first.insert("headerColor".to_string(), "#fff".into());
        first.insert("headerImage".to_string(), "/uploads/a.png".into());
        tree.set_design(id, first).unwrap();

        let mut second = Design::new();
        second.insert("headerColor".to_string(), "#000".into());
        let design = tree.set_design(id, second).unwrap();

        assert_eq!(design["headerColor"], "#000");
        assert_eq!(design["headerImage"], "/uploads/a.png");
    }
}
