//! B-tree of minimum degree `t`: every node but the root holds between
//! `t - 1` and `2t - 1` keys. Insertion splits full nodes on the way down,
//! so a single downward pass always finds room.

use algoviz_player_core::{FrameRecorder, FrameSequence};

use super::{check_keys, NodeMark, TreeNodeView, TreeSnapshot};
use crate::error::GenerateError;
use crate::Result;

pub const MIN_DEGREE: usize = 2;
pub const MAX_DEGREE: usize = 5;

#[derive(Clone, Debug)]
struct BNode {
    keys: Vec<i64>,
    children: Vec<usize>,
    mark: NodeMark,
}

impl BNode {
    fn leaf(&self) -> bool {
        self.children.is_empty()
    }
}

struct BTree {
    t: usize,
    nodes: Vec<BNode>,
    root: Option<usize>,
    rec: Option<FrameRecorder<TreeSnapshot>>,
}

impl BTree {
    fn build(t: usize, keys: &[i64]) -> Self {
        let mut tree = Self {
            t,
            nodes: Vec::new(),
            root: None,
            rec: None,
        };
        for &k in keys {
            tree.insert(k);
        }
        tree.nodes.iter_mut().for_each(|n| n.mark = NodeMark::None);
        tree.rec = Some(FrameRecorder::new());
        tree
    }

    fn alloc(&mut self, keys: Vec<i64>, children: Vec<usize>) -> usize {
        self.nodes.push(BNode {
            keys,
            children,
            mark: NodeMark::None,
        });
        self.nodes.len() - 1
    }

    fn full(&self, i: usize) -> bool {
        self.nodes[i].keys.len() == 2 * self.t - 1
    }

    fn contains(&self, key: i64) -> bool {
        self.nodes.iter().any(|n| n.keys.contains(&key))
    }

    fn mark(&mut self, i: usize, mark: NodeMark) {
        self.nodes[i].mark = mark;
    }

    fn keys_text(&self, i: usize) -> String {
        format!("{:?}", self.nodes[i].keys)
    }

    fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(id, n)| TreeNodeView {
                    id,
                    keys: n.keys.clone(),
                    children: n.children.iter().copied().map(Some).collect(),
                    mark: n.mark,
                    height: None,
                    balance: None,
                })
                .collect(),
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
        self.nodes.iter_mut().for_each(|n| n.mark = NodeMark::None);
        self.record(desc);
        self.rec.take().map(FrameRecorder::finish).unwrap_or_default()
    }

    fn insert(&mut self, key: i64) {
        let Some(root) = self.root else {
            let n = self.alloc(vec![key], Vec::new());
            self.root = Some(n);
            self.mark(n, NodeMark::Inserted);
            self.record(format!("{key} starts a new root"));
            return;
        };
        if self.full(root) {
            self.mark(root, NodeMark::Splitting);
            self.record(format!("Root {} is full: grow a new root", self.keys_text(root)));
            let s = self.alloc(Vec::new(), vec![root]);
            self.root = Some(s);
            self.split_child(s, 0);
            self.insert_nonfull(s, key);
        } else {
            self.insert_nonfull(root, key);
        }
    }

    /// Split the full child `x.children[i]` around its median, which moves
    /// up into `x`.
    fn split_child(&mut self, x: usize, i: usize) {
        let t = self.t;
        let y = self.nodes[x].children[i];
        let median = self.nodes[y].keys[t - 1];
        let right_keys = self.nodes[y].keys.split_off(t);
        self.nodes[y].keys.truncate(t - 1);
        let right_children = if self.nodes[y].leaf() {
            Vec::new()
        } else {
            self.nodes[y].children.split_off(t)
        };
        let z = self.alloc(right_keys, right_children);
        self.nodes[x].children.insert(i + 1, z);
        self.nodes[x].keys.insert(i, median);
        self.mark(y, NodeMark::Splitting);
        self.mark(z, NodeMark::Splitting);
        self.mark(x, NodeMark::Inserted);
        self.record(format!(
            "Split around {median}: {median} moves up, {} and {} become siblings",
            self.keys_text(y),
            self.keys_text(z)
        ));
        self.mark(y, NodeMark::None);
        self.mark(z, NodeMark::None);
        self.mark(x, NodeMark::Visiting);
    }

    fn insert_nonfull(&mut self, mut x: usize, key: i64) {
        loop {
            self.mark(x, NodeMark::Visiting);
            let pos = self.nodes[x].keys.partition_point(|&k| k < key);
            if self.nodes[x].leaf() {
                self.nodes[x].keys.insert(pos, key);
                self.mark(x, NodeMark::Inserted);
                self.record(format!(
                    "Insert {key} into leaf {}",
                    self.keys_text(x)
                ));
                return;
            }
            self.record(format!(
                "{key} belongs under child {pos} of {}",
                self.keys_text(x)
            ));
            let mut i = pos;
            let child = self.nodes[x].children[i];
            if self.full(child) {
                self.mark(child, NodeMark::Splitting);
                self.record(format!(
                    "Child {} is full: split it before descending",
                    self.keys_text(child)
                ));
                self.split_child(x, i);
                if key > self.nodes[x].keys[i] {
                    i += 1;
                }
            }
            x = self.nodes[x].children[i];
        }
    }

    /// Narrated descent. Returns the node holding `key`, if any.
    fn search(&mut self, key: i64) -> Option<usize> {
        let mut at = self.root;
        while let Some(x) = at {
            self.mark(x, NodeMark::Visiting);
            let pos = self.nodes[x].keys.partition_point(|&k| k < key);
            if self.nodes[x].keys.get(pos) == Some(&key) {
                return Some(x);
            }
            if self.nodes[x].leaf() {
                self.record(format!(
                    "{key} is not in leaf {}",
                    self.keys_text(x)
                ));
                return None;
            }
            self.record(format!(
                "{key} is not in {}: follow child {pos}",
                self.keys_text(x)
            ));
            at = Some(self.nodes[x].children[pos]);
        }
        None
    }
}

fn check_degree(t: usize) -> Result<()> {
    if !(MIN_DEGREE..=MAX_DEGREE).contains(&t) {
        return Err(GenerateError::out_of_range(
            "minimum degree",
            t as i64,
            MIN_DEGREE as i64,
            MAX_DEGREE as i64,
        ));
    }
    Ok(())
}

/// Insert `key` into the B-tree of minimum degree `t` built from `keys`.
pub fn btree_insert(keys: &[i64], t: usize, key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_degree(t)?;
    check_keys(keys, key, 1)?;
    let mut tree = BTree::build(t, keys);
    tree.record(format!("Insert {key} (t = {t})"));
    if tree.contains(key) {
        if let Some(x) = tree.search(key) {
            tree.mark(x, NodeMark::Found);
        }
        tree.record(format!("{key} is already present"));
        return Ok(tree.finish("Tree unchanged"));
    }
    tree.insert(key);
    Ok(tree.finish(format!("Inserted {key}")))
}

pub fn btree_search(keys: &[i64], t: usize, key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_degree(t)?;
    check_keys(keys, key, 0)?;
    let mut tree = BTree::build(t, keys);
    tree.record(format!("Search for {key}"));
    match tree.search(key) {
        Some(x) => {
            tree.mark(x, NodeMark::Found);
            tree.record(format!("Found {key} in {}", tree.keys_text(x)));
            Ok(tree.rec.take().map(FrameRecorder::finish).unwrap_or_default())
        }
        None => Ok(tree.finish(format!("{key} is not in the tree"))),
    }
}
