use algoviz_player_core::FrameSequence;

use super::{check_keys, BinaryTree, NodeMark, TreeSnapshot};
use crate::Result;

/// Build an unbalanced BST by inserting `keys` in order.
fn build(keys: &[i64]) -> BinaryTree {
    let mut tree = BinaryTree::new(false);
    for &k in keys {
        tree.insert_silent(k);
    }
    tree.start_recording();
    tree
}

pub fn bst_insert(keys: &[i64], key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_keys(keys, key, 1)?;
    let mut tree = build(keys);
    tree.record(format!("Insert {key}"));

    let Some(mut at) = tree.root else {
        let n = tree.alloc(key);
        tree.root = Some(n);
        tree.mark(n, NodeMark::Inserted);
        tree.record(format!("{key} becomes the root"));
        return Ok(tree.finish(format!("Inserted {key}")));
    };

    loop {
        let k = tree.key(at);
        tree.mark(at, NodeMark::Visiting);
        if key == k {
            tree.mark(at, NodeMark::Found);
            tree.record(format!("{key} is already present"));
            return Ok(tree.finish("Tree unchanged"));
        }
        let go_left = key < k;
        let next = if go_left { tree.left(at) } else { tree.right(at) };
        let side = if go_left { "left" } else { "right" };
        tree.record(format!(
            "{key} {} {k}: go {side}",
            if go_left { "<" } else { ">" }
        ));
        match next {
            Some(n) => at = n,
            None => {
                let n = tree.alloc(key);
                if go_left {
                    tree.node_mut(at).left = Some(n);
                } else {
                    tree.node_mut(at).right = Some(n);
                }
                tree.mark(n, NodeMark::Inserted);
                tree.record(format!("Attach {key} as the {side} child of {k}"));
                return Ok(tree.finish(format!("Inserted {key}")));
            }
        }
    }
}

pub fn bst_search(keys: &[i64], key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_keys(keys, key, 0)?;
    let mut tree = build(keys);
    tree.record(format!("Search for {key}"));
    match descend(&mut tree, key) {
        (Some(at), _) => {
            tree.mark(at, NodeMark::Found);
            tree.record(format!("Found {key}"));
            Ok(tree.rec.take().map(|r| r.finish()).unwrap_or_default())
        }
        (None, _) => Ok(tree.finish(format!("{key} is not in the tree"))),
    }
}

/// Walk towards `key`, one frame per node. Returns the node holding it (if
/// any) and its parent.
fn descend(tree: &mut BinaryTree, key: i64) -> (Option<usize>, Option<usize>) {
    let mut parent = None;
    let mut at = tree.root;
    while let Some(i) = at {
        let k = tree.key(i);
        tree.mark(i, NodeMark::Visiting);
        if k == key {
            return (Some(i), parent);
        }
        let go_left = key < k;
        tree.record(format!(
            "{key} {} {k}: go {}",
            if go_left { "<" } else { ">" },
            if go_left { "left" } else { "right" }
        ));
        parent = Some(i);
        at = if go_left { tree.left(i) } else { tree.right(i) };
    }
    (None, parent)
}

/// Remove `key`: a leaf is dropped, a single child is spliced up, and a node
/// with two children takes its in-order successor's key.
pub fn bst_delete(keys: &[i64], key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_keys(keys, key, 0)?;
    let mut tree = build(keys);
    tree.record(format!("Delete {key}"));

    let (Some(target), parent) = descend(&mut tree, key) else {
        return Ok(tree.finish(format!("{key} is not in the tree")));
    };
    tree.mark(target, NodeMark::Removing);

    match (tree.left(target), tree.right(target)) {
        (None, None) => {
            tree.record(format!("{key} is a leaf: remove it"));
            tree.relink(parent, target, None);
            tree.free(target);
        }
        (Some(only), None) | (None, Some(only)) => {
            tree.record(format!(
                "{key} has one child: {} takes its place",
                tree.key(only)
            ));
            tree.relink(parent, target, Some(only));
            tree.free(target);
        }
        (Some(_), Some(right)) => {
            tree.record(format!(
                "{key} has two children: find its in-order successor"
            ));
            let mut succ_parent = target;
            let mut succ = right;
            tree.mark(succ, NodeMark::Visiting);
            tree.record(format!("Step right to {}", tree.key(succ)));
            while let Some(l) = tree.left(succ) {
                succ_parent = succ;
                succ = l;
                tree.mark(succ, NodeMark::Visiting);
                tree.record(format!("Step left to {}", tree.key(succ)));
            }
            let succ_key = tree.key(succ);
            tree.mark(succ, NodeMark::Found);
            tree.record(format!("Successor is {succ_key}"));

            tree.node_mut(target).key = succ_key;
            tree.mark(target, NodeMark::Inserted);
            tree.mark(succ, NodeMark::Removing);
            tree.record(format!("Copy {succ_key} over {key}"));

            let succ_right = tree.right(succ);
            tree.relink(Some(succ_parent), succ, succ_right);
            tree.free(succ);
            tree.record(format!("Remove the old {succ_key} node"));
        }
    }
    Ok(tree.finish(format!("Deleted {key}")))
}
