use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMark {
    #[default]
    None,
    Visiting,
    Found,
    Inserted,
    Rotating,
    Removing,
    Splitting,
}

/// One node of a flattened tree.
///
/// Binary trees always carry two child slots (left, right). B-tree nodes
/// carry `keys.len() + 1` children, or none for a leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeView {
    pub id: usize,
    pub keys: Vec<i64>,
    pub children: Vec<Option<usize>>,
    pub mark: NodeMark,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub nodes: Vec<TreeNodeView>,
    pub root: Option<usize>,
}

impl TreeSnapshot {
    pub fn node(&self, id: usize) -> Option<&TreeNodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root_node(&self) -> Option<&TreeNodeView> {
        self.root.and_then(|id| self.node(id))
    }

    /// Keys in sorted (in-order) order.
    pub fn in_order(&self) -> Vec<i64> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.walk(root, &mut out);
        }
        out
    }

    fn walk(&self, id: usize, out: &mut Vec<i64>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.children.is_empty() {
            out.extend_from_slice(&node.keys);
            return;
        }
        for (i, child) in node.children.iter().enumerate() {
            if let Some(c) = child {
                self.walk(*c, out);
            }
            if let Some(k) = node.keys.get(i) {
                out.push(*k);
            }
        }
    }

    /// Nodes carrying `mark`.
    pub fn marked(&self, mark: NodeMark) -> impl Iterator<Item = &TreeNodeView> {
        self.nodes.iter().filter(move |n| n.mark == mark)
    }
}
