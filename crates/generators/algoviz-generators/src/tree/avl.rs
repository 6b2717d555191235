use algoviz_player_core::FrameSequence;

use super::{check_keys, BinaryTree, NodeMark, TreeSnapshot};
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Imbalance {
    LeftLeft,
    RightRight,
    LeftRight,
    RightLeft,
}

impl Imbalance {
    fn label(self) -> &'static str {
        match self {
            Self::LeftLeft => "LL",
            Self::RightRight => "RR",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

/// Insert `key` into the AVL tree holding `keys`, narrating each rotation.
pub fn avl_insert(keys: &[i64], key: i64) -> Result<FrameSequence<TreeSnapshot>> {
    check_keys(keys, key, 1)?;
    let mut tree = BinaryTree::new(true);
    for &k in keys {
        insert(&mut tree, k);
    }
    tree.clear_marks();
    tree.start_recording();
    tree.record(format!("Insert {key}"));
    if insert(&mut tree, key) {
        Ok(tree.finish(format!("Inserted {key}; tree is balanced")))
    } else {
        Ok(tree.finish("Tree unchanged"))
    }
}

/// BST descent, then rebalance on the way back up. Returns false for a
/// duplicate. Frames are only captured while the tree is recording.
fn insert(tree: &mut BinaryTree, key: i64) -> bool {
    let mut path = Vec::new();
    let mut at = tree.root;
    while let Some(i) = at {
        let k = tree.key(i);
        tree.mark(i, NodeMark::Visiting);
        if k == key {
            tree.mark(i, NodeMark::Found);
            tree.record(format!("{key} is already present"));
            return false;
        }
        let go_left = key < k;
        tree.record(format!(
            "{key} {} {k}: go {}",
            if go_left { "<" } else { ">" },
            if go_left { "left" } else { "right" }
        ));
        path.push(i);
        at = if go_left { tree.left(i) } else { tree.right(i) };
    }

    let n = tree.alloc(key);
    match path.last() {
        None => tree.root = Some(n),
        Some(&p) if key < tree.key(p) => tree.node_mut(p).left = Some(n),
        Some(&p) => tree.node_mut(p).right = Some(n),
    }
    tree.mark(n, NodeMark::Inserted);
    tree.record(format!("Attach {key}"));

    while let Some(z) = path.pop() {
        tree.update_height(z);
        let balance = tree.balance(z);
        if balance.abs() <= 1 {
            continue;
        }
        let case = match (balance > 1, tree.left(z), tree.right(z)) {
            (true, Some(l), _) if key < tree.key(l) => Imbalance::LeftLeft,
            (true, _, _) => Imbalance::LeftRight,
            (false, _, Some(r)) if key > tree.key(r) => Imbalance::RightRight,
            (false, _, _) => Imbalance::RightLeft,
        };
        tree.clear_marks();
        tree.mark(z, NodeMark::Rotating);
        tree.record(format!(
            "{} is unbalanced (balance {balance}): {} case",
            tree.key(z),
            case.label()
        ));

        let new_root = match case {
            Imbalance::LeftLeft => rotate_right(tree, z),
            Imbalance::RightRight => rotate_left(tree, z),
            Imbalance::LeftRight => {
                if let Some(l) = tree.left(z) {
                    let nl = rotate_left(tree, l);
                    tree.node_mut(z).left = Some(nl);
                    tree.record(format!("Rotate left around {}", tree.key(l)));
                }
                rotate_right(tree, z)
            }
            Imbalance::RightLeft => {
                if let Some(r) = tree.right(z) {
                    let nr = rotate_right(tree, r);
                    tree.node_mut(z).right = Some(nr);
                    tree.record(format!("Rotate right around {}", tree.key(r)));
                }
                rotate_left(tree, z)
            }
        };
        tree.relink(path.last().copied(), z, Some(new_root));
        let dir = match case {
            Imbalance::LeftLeft | Imbalance::LeftRight => "right",
            Imbalance::RightRight | Imbalance::RightLeft => "left",
        };
        tree.record(format!(
            "Rotate {dir} around {}: {} moves up",
            tree.key(z),
            tree.key(new_root)
        ));
    }
    true
}

/// Returns the new subtree root. The caller relinks it.
fn rotate_right(tree: &mut BinaryTree, y: usize) -> usize {
    let Some(x) = tree.left(y) else {
        return y;
    };
    let t2 = tree.right(x);
    tree.node_mut(x).right = Some(y);
    tree.node_mut(y).left = t2;
    tree.update_height(y);
    tree.update_height(x);
    x
}

fn rotate_left(tree: &mut BinaryTree, x: usize) -> usize {
    let Some(y) = tree.right(x) else {
        return x;
    };
    let t2 = tree.left(y);
    tree.node_mut(y).left = Some(x);
    tree.node_mut(x).right = t2;
    tree.update_height(x);
    tree.update_height(y);
    y
}
