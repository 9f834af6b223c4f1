use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PageTree, TreeError};
use crate::models::NodeKind;

/// One node of a requested sidebar order. `children` mirrors the nesting
/// wanted for a chapter; when it is absent the chapter keeps its current
/// children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OrderEntry>>,
}

impl OrderEntry {
    pub fn leaf(id: Uuid) -> Self {
        Self { id, children: None }
    }

    pub fn nested(id: Uuid, children: Vec<OrderEntry>) -> Self {
        Self {
            id,
            children: Some(children),
        }
    }
}

#[derive(Default)]
struct Plan {
    seen: HashSet<Uuid>,
    parents: HashMap<Uuid, Option<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl Plan {
    fn visit(&mut self, id: Uuid, parent: Option<Uuid>) -> Result<(), TreeError> {
        if !self.seen.insert(id) {
            return Err(TreeError::InvalidState(format!(
                "node {} appears more than once in the order",
                id
            )));
        }
        self.parents.insert(id, parent);
        Ok(())
    }
}

impl PageTree {
    /// Rebuilds the forest in the order and nesting given by `order`.
    ///
    /// The order must mention every node exactly once, either directly or
    /// through a chapter entry without `children`, which keeps its current
    /// subtree. Nothing is changed unless the whole order is valid.
    pub fn reorder(&mut self, order: &[OrderEntry]) -> Result<(), TreeError> {
        let mut plan = Plan::default();
        let roots = self.plan_level(order, None, &mut plan)?;

        let missing = self.entries.len() - plan.seen.len();
        if missing > 0 {
            return Err(TreeError::InvalidState(format!(
                "order is missing {} node(s)",
                missing
            )));
        }

        for (id, parent) in plan.parents {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.parent = parent;
            }
        }
        for (id, ids) in plan.children {
            if let Some(entry) = self.entries.get_mut(&id) {
                if let NodeKind::Chapter { children } = &mut entry.node.kind {
                    *children = ids;
                }
            }
        }
        self.roots = roots;

        Ok(())
    }

    fn plan_level(
        &self,
        entries: &[OrderEntry],
        parent: Option<Uuid>,
        plan: &mut Plan,
    ) -> Result<Vec<Uuid>, TreeError> {
        let mut ids = Vec::with_capacity(entries.len());

        for entry in entries {
            let node = self.find_by_id(entry.id)?;
            plan.visit(entry.id, parent)?;

            match (&node.kind, &entry.children) {
                (NodeKind::Chapter { .. }, Some(children)) => {
                    let child_ids = self.plan_level(children, Some(entry.id), plan)?;
                    plan.children.insert(entry.id, child_ids);
                }
                (NodeKind::Chapter { children }, None) => {
                    self.plan_kept(children, entry.id, plan)?;
                }
                (NodeKind::Page { .. }, Some(children)) if !children.is_empty() => {
                    return Err(TreeError::InvalidParent);
                }
                (NodeKind::Page { .. }, _) => {}
            }

            ids.push(entry.id);
        }

        Ok(ids)
    }

    fn plan_kept(&self, children: &[Uuid], parent: Uuid, plan: &mut Plan) -> Result<(), TreeError> {
        for child in children {
            plan.visit(*child, Some(parent))?;
            let node = self.find_by_id(*child)?;
            self.plan_kept(node.children(), *child, plan)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use pretty_assertions::assert_eq;

    struct Fixture {
        tree: PageTree,
        a: Uuid,
        a1: Uuid,
        a2: Uuid,
        b: Uuid,
        c: Uuid,
    }

    fn fixture() -> Fixture {
        let mut tree = PageTree::new();
        let a = tree
            .insert(Node::chapter(Uuid::new_v4(), "A").unwrap(), None)
            .unwrap();
        let a1 = tree
            .insert(Node::page(Uuid::new_v4(), "A1", "a1", "<p>1</p>").unwrap(), Some(a))
            .unwrap();
        let a2 = tree
            .insert(Node::page(Uuid::new_v4(), "A2", "a2", "<p>2</p>").unwrap(), Some(a))
            .unwrap();
        let b = tree
            .insert(Node::chapter(Uuid::new_v4(), "B").unwrap(), None)
            .unwrap();
        let c = tree
            .insert(Node::page(Uuid::new_v4(), "C", "c", "<p>c</p>").unwrap(), None)
            .unwrap();
        Fixture { tree, a, a1, a2, b, c }
    }

    fn ids(tree: &PageTree) -> Vec<Uuid> {
        tree.flatten().iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_reorder_moves_and_reparents() {
        let Fixture { mut tree, a, a1, a2, b, c } = fixture();

        tree.reorder(&[
            OrderEntry::nested(b, vec![OrderEntry::leaf(a2)]),
            OrderEntry::leaf(c),
            OrderEntry::nested(a, vec![OrderEntry::leaf(a1)]),
        ])
        .unwrap();

        assert_eq!(ids(&tree), vec![b, a2, c, a, a1]);
        assert_eq!(tree.find_parent(a2).unwrap().unwrap().id, b);
        assert_eq!(tree.find_by_id(a).unwrap().children(), &[a1]);
        assert_eq!(tree.roots(), &[b, c, a]);
    }

    #[test]
    fn test_reorder_moves_page_to_root() {
        let Fixture { mut tree, a, a1, a2, b, c } = fixture();

        tree.reorder(&[
            OrderEntry::leaf(a1),
            OrderEntry::nested(a, vec![OrderEntry::leaf(a2)]),
            OrderEntry::leaf(b),
            OrderEntry::leaf(c),
        ])
        .unwrap();

        assert_eq!(tree.find_parent(a1).unwrap(), None);
        assert_eq!(ids(&tree), vec![a1, a, a2, b, c]);
    }

    #[test]
    fn test_reorder_chapter_without_children_keeps_subtree() {
        let Fixture { mut tree, a, a1, a2, b, c } = fixture();

        tree.reorder(&[OrderEntry::leaf(c), OrderEntry::leaf(a), OrderEntry::leaf(b)])
            .unwrap();

        assert_eq!(ids(&tree), vec![c, a, a1, a2, b]);
    }

    #[test]
    fn test_reorder_missing_node_fails_closed() {
        let Fixture { mut tree, a, a1, b, .. } = fixture();
        let before = tree.clone();

        let result = tree.reorder(&[
            OrderEntry::nested(a, vec![OrderEntry::leaf(a1)]),
            OrderEntry::leaf(b),
        ]);

        assert!(matches!(result, Err(TreeError::InvalidState(_))));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_reorder_duplicate_node_fails() {
        let Fixture { mut tree, a, a1, a2, b, c } = fixture();
        let before = tree.clone();

        // a1 is listed explicitly and also kept under a
        let result = tree.reorder(&[
            OrderEntry::leaf(a1),
            OrderEntry::leaf(a),
            OrderEntry::leaf(a2),
            OrderEntry::leaf(b),
            OrderEntry::leaf(c),
        ]);

        assert!(matches!(result, Err(TreeError::InvalidState(_))));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_reorder_unknown_node_fails() {
        let Fixture { mut tree, .. } = fixture();

        let result = tree.reorder(&[OrderEntry::leaf(Uuid::new_v4())]);

        assert_eq!(result, Err(TreeError::NotFound));
    }

    #[test]
    fn test_reorder_children_under_page_fails() {
        let Fixture { mut tree, a, a1, a2, b, c } = fixture();
        let before = tree.clone();

        let result = tree.reorder(&[
            OrderEntry::nested(a, vec![OrderEntry::nested(a1, vec![OrderEntry::leaf(a2)])]),
            OrderEntry::leaf(b),
            OrderEntry::leaf(c),
        ]);

        assert_eq!(result, Err(TreeError::InvalidParent));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_order_entry_deserializes_without_children() {
        let id = Uuid::new_v4();
        let json = format!(r#"[{{"id":"{}"}}]"#, id);

        let order: Vec<OrderEntry> = serde_json::from_str(&json).unwrap();

        assert_eq!(order, vec![OrderEntry::leaf(id)]);
    }
}
