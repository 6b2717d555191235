//! Search trees: BST, AVL and B-tree.
//!
//! Every generator takes the current key set plus the key to operate on. It
//! rebuilds a working tree from the key set silently, then records frames
//! only for the requested operation.

mod avl;
mod bst;
mod btree;
mod view;

pub use avl::avl_insert;
pub use bst::{bst_delete, bst_insert, bst_search};
pub use btree::{btree_insert, btree_search};
pub use view::{NodeMark, TreeNodeView, TreeSnapshot};

use algoviz_player_core::{FrameRecorder, FrameSequence};
use hashbrown::HashSet;

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

/// Shared input checks: size, value range, no duplicate keys.
fn check_keys(keys: &[i64], key: i64, extra: usize) -> Result<()> {
    let limits = GeneratorLimits::default();
    limits.check_nodes("tree", keys.len() + extra)?;
    limits.check_values("tree", keys)?;
    limits.check_value("key", key)?;
    let mut seen = HashSet::with_capacity(keys.len());
    for &k in keys {
        if !seen.insert(k) {
            return Err(GenerateError::malformed(format!(
                "key {k} appears more than once"
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
struct BinNode {
    key: i64,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
    mark: NodeMark,
}

/// Arena-backed binary tree used by the BST and AVL generators.
///
/// Frames are only captured once `rec` is set, so the initial build is silent.
struct BinaryTree {
    nodes: Vec<Option<BinNode>>,
    root: Option<usize>,
    show_height: bool,
    rec: Option<FrameRecorder<TreeSnapshot>>,
}

impl BinaryTree {
    fn new(show_height: bool) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            show_height,
            rec: None,
        }
    }

    fn start_recording(&mut self) {
        self.rec = Some(FrameRecorder::new());
    }

    fn node(&self, i: usize) -> &BinNode {
        match &self.nodes[i] {
            Some(n) => n,
            None => unreachable!("link to freed node {i}"),
        }
    }

    fn node_mut(&mut self, i: usize) -> &mut BinNode {
        match &mut self.nodes[i] {
            Some(n) => n,
            None => unreachable!("link to freed node {i}"),
        }
    }

    #[inline]
    fn key(&self, i: usize) -> i64 {
        self.node(i).key
    }

    #[inline]
    fn left(&self, i: usize) -> Option<usize> {
        self.node(i).left
    }

    #[inline]
    fn right(&self, i: usize) -> Option<usize> {
        self.node(i).right
    }

    fn alloc(&mut self, key: i64) -> usize {
        self.nodes.push(Some(BinNode {
            key,
            left: None,
            right: None,
            height: 1,
            mark: NodeMark::None,
        }));
        self.nodes.len() - 1
    }

    fn free(&mut self, i: usize) {
        self.nodes[i] = None;
    }

    fn height(&self, i: Option<usize>) -> i32 {
        i.map_or(0, |i| self.node(i).height)
    }

    fn update_height(&mut self, i: usize) {
        let h = 1 + self.height(self.left(i)).max(self.height(self.right(i)));
        self.node_mut(i).height = h;
    }

    fn balance(&self, i: usize) -> i32 {
        self.height(self.left(i)) - self.height(self.right(i))
    }

    fn mark(&mut self, i: usize, mark: NodeMark) {
        self.node_mut(i).mark = mark;
    }

    fn clear_marks(&mut self) {
        for n in self.nodes.iter_mut().flatten() {
            n.mark = NodeMark::None;
        }
    }

    /// Point whichever link of `parent` held `old` at `new`; `None` parent
    /// means the root.
    fn relink(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let n = self.node_mut(p);
                if n.left == Some(old) {
                    n.left = new;
                } else {
                    n.right = new;
                }
            }
        }
    }

    /// Plain BST insert without frames. Returns false for a duplicate.
    fn insert_silent(&mut self, key: i64) -> bool {
        let Some(mut at) = self.root else {
            self.root = Some(self.alloc(key));
            return true;
        };
        loop {
            let k = self.key(at);
            if key == k {
                return false;
            }
            let next = if key < k { self.left(at) } else { self.right(at) };
            match next {
                Some(n) => at = n,
                None => {
                    let n = self.alloc(key);
                    if key < k {
                        self.node_mut(at).left = Some(n);
                    } else {
                        self.node_mut(at).right = Some(n);
                    }
                    return true;
                }
            }
        }
    }

    fn snapshot(&self) -> TreeSnapshot {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(id, n)| n.as_ref().map(|n| (id, n)))
            .map(|(id, n)| TreeNodeView {
                id,
                keys: vec![n.key],
                children: vec![n.left, n.right],
                mark: n.mark,
                height: self.show_height.then_some(n.height),
                balance: self.show_height.then(|| self.balance(id)),
            })
            .collect();
        TreeSnapshot {
            nodes,
            root: self.root,
        }
    }

    fn record(&mut self, desc: impl Into<String>) {
        if self.rec.is_none() {
            return;
        }
        let snap = self.snapshot();
        if let Some(rec) = self.rec.as_mut() {
            rec.push(snap, desc);
        }
    }

    fn finish(mut self, desc: impl Into<String>) -> FrameSequence<TreeSnapshot> {
        self.clear_marks();
        self.record(desc);
        self.rec.take().map(FrameRecorder::finish).unwrap_or_default()
    }
}
