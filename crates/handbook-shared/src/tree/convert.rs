use std::collections::HashMap;

use uuid::Uuid;

use super::{PageTree, TreeError};
use crate::models::{NodeDocument, NodeRow};

impl PageTree {
    /// Builds a tree from the nested document form, validating every invariant.
    pub fn from_documents(docs: &[NodeDocument]) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        tree.insert_documents(docs, None)?;
        Ok(tree)
    }

    fn insert_documents(
        &mut self,
        docs: &[NodeDocument],
        parent: Option<Uuid>,
    ) -> Result<(), TreeError> {
        for doc in docs {
            let id = self.insert(doc.to_node()?, parent)?;
            if let Some(children) = &doc.children {
                self.insert_documents(children, Some(id))?;
            }
        }
        Ok(())
    }

    /// Nested document form of the whole forest.
    pub fn to_documents(&self) -> Vec<NodeDocument> {
        self.documents(&self.roots)
    }

    /// Nested document for one node and its subtree.
    pub fn document(&self, id: Uuid) -> Result<NodeDocument, TreeError> {
        let node = self.find_by_id(id)?;
        let mut doc = NodeDocument::from_node(node);
        if node.is_chapter() {
            doc.children = Some(self.documents(node.children()));
        }
        Ok(doc)
    }

    fn documents(&self, ids: &[Uuid]) -> Vec<NodeDocument> {
        ids.iter().filter_map(|id| self.document(*id).ok()).collect()
    }

    /// Rebuilds the forest from flat rows linked by `parent_id`.
    ///
    /// Siblings are ordered by `position`, ties by row order. Rows that
    /// cannot be reached from a root (dangling parent or a cycle) are an
    /// error rather than being silently dropped.
    pub fn from_rows(rows: &[NodeRow]) -> Result<Self, TreeError> {
        let mut by_parent: HashMap<Option<Uuid>, Vec<&NodeRow>> = HashMap::new();
        for row in rows {
            by_parent.entry(row.parent_id).or_default().push(row);
        }
        for siblings in by_parent.values_mut() {
            // stable sort keeps row order for equal positions
            siblings.sort_by_key(|row| row.position);
        }

        let mut tree = Self::new();
        let mut pending = vec![None];
        while let Some(parent) = pending.pop() {
            let Some(siblings) = by_parent.remove(&parent) else {
                continue;
            };
            for row in siblings {
                tree.insert(row.to_node()?, parent)?;
                pending.push(Some(row.id));
            }
        }

        if tree.len() != rows.len() {
            return Err(TreeError::InvalidState(format!(
                "{} row(s) are not reachable from the root",
                rows.len() - tree.len()
            )));
        }

        Ok(tree)
    }

    /// Flat rows in pre-order, each with its parent and sibling position.
    pub fn to_rows(&self) -> Vec<NodeRow> {
        self.walk()
            .into_iter()
            .map(|(node, parent, position)| NodeRow::from_node(node, parent, position as i64))
            .collect()
    }
}
