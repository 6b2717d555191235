//! Singly linked list operations.
//!
//! Nodes live in an arena and link by index. Snapshots keep arena order, so
//! a node keeps its slot while links move around it; use
//! [`ListSnapshot::values`] for list order.

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMark {
    #[default]
    None,
    Visiting,
    New,
    Found,
    Removing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNodeView {
    pub value: i64,
    pub next: Option<usize>,
    pub mark: ListMark,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub nodes: Vec<ListNodeView>,
    pub head: Option<usize>,
    /// Node the traversal pointer is on.
    pub cursor: Option<usize>,
    /// Trailing pointer used by delete and reverse.
    pub prev: Option<usize>,
}

impl ListSnapshot {
    /// Values from head to tail.
    pub fn values(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut at = self.head;
        // Bounded by node count so a bad link cannot loop forever.
        while let Some(i) = at {
            if out.len() == self.nodes.len() {
                break;
            }
            out.push(self.nodes[i].value);
            at = self.nodes[i].next;
        }
        out
    }
}

struct ListTrace {
    s: ListSnapshot,
    rec: FrameRecorder<ListSnapshot>,
}

impl ListTrace {
    fn build(values: &[i64], extra: usize) -> Result<Self> {
        let limits = GeneratorLimits::default();
        limits.check_nodes("list", values.len() + extra)?;
        limits.check_values("list", values)?;
        let n = values.len();
        let nodes = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ListNodeView {
                value,
                next: (i + 1 < n).then_some(i + 1),
                mark: ListMark::None,
            })
            .collect();
        Ok(Self {
            s: ListSnapshot {
                nodes,
                head: (n > 0).then_some(0),
                cursor: None,
                prev: None,
            },
            rec: FrameRecorder::new(),
        })
    }

    fn clear_marks(&mut self) {
        self.s.nodes.iter_mut().for_each(|n| n.mark = ListMark::None);
    }

    fn mark(&mut self, i: usize, mark: ListMark) {
        self.s.nodes[i].mark = mark;
    }

    fn record(&mut self, desc: impl Into<String>) {
        self.rec.record(&self.s, desc);
    }

    /// Walk `steps` links from the head, one frame per hop.
    fn walk(&mut self, steps: usize) -> Option<usize> {
        let mut at = self.s.head?;
        for _ in 0..steps {
            self.clear_marks();
            self.s.cursor = Some(at);
            self.mark(at, ListMark::Visiting);
            self.record(format!("Move past {}", self.s.nodes[at].value));
            at = self.s.nodes[at].next?;
        }
        Some(at)
    }

    fn alloc(&mut self, value: i64, next: Option<usize>) -> usize {
        self.s.nodes.push(ListNodeView {
            value,
            next,
            mark: ListMark::New,
        });
        self.s.nodes.len() - 1
    }

    fn done(mut self, desc: impl Into<String>) -> FrameSequence<ListSnapshot> {
        self.clear_marks();
        self.s.cursor = None;
        self.s.prev = None;
        self.record(desc);
        self.rec.finish()
    }
}

pub fn insert_head(list: &[i64], value: i64) -> Result<FrameSequence<ListSnapshot>> {
    GeneratorLimits::default().check_value("value", value)?;
    let mut t = ListTrace::build(list, 1)?;
    t.record(format!("Insert {value} at the head"));
    let old = t.s.head;
    let node = t.alloc(value, old);
    t.record(format!("New node {value} points at the old head"));
    t.s.head = Some(node);
    t.record(format!("Head now points at {value}"));
    Ok(t.done(format!("{value} inserted at the head")))
}

pub fn insert_tail(list: &[i64], value: i64) -> Result<FrameSequence<ListSnapshot>> {
    insert_at(list, list.len(), value)
}

/// Insert so that `value` ends up at position `index`; `index == len` appends.
pub fn insert_at(list: &[i64], index: usize, value: i64) -> Result<FrameSequence<ListSnapshot>> {
    if index > list.len() {
        return Err(GenerateError::out_of_range(
            "index",
            index as i64,
            0,
            list.len() as i64,
        ));
    }
    if index == 0 {
        return insert_head(list, value);
    }
    GeneratorLimits::default().check_value("value", value)?;
    let mut t = ListTrace::build(list, 1)?;
    t.record(format!("Insert {value} at position {index}"));

    let Some(before) = t.walk(index - 1) else {
        return Err(GenerateError::malformed("list ended early"));
    };
    t.clear_marks();
    t.s.cursor = Some(before);
    t.mark(before, ListMark::Visiting);
    t.record(format!("Stop at {}", t.s.nodes[before].value));

    let after = t.s.nodes[before].next;
    let node = t.alloc(value, after);
    t.record(format!("New node {value} points at the node after it"));
    t.s.nodes[before].next = Some(node);
    t.record(format!("{} now points at {value}", t.s.nodes[before].value));
    Ok(t.done(format!("{value} inserted at position {index}")))
}

/// Unlink the first node holding `value`.
pub fn delete_value(list: &[i64], value: i64) -> Result<FrameSequence<ListSnapshot>> {
    let mut t = ListTrace::build(list, 0)?;
    t.record(format!("Delete {value}"));

    let mut prev: Option<usize> = None;
    let mut at = t.s.head;
    while let Some(i) = at {
        t.clear_marks();
        t.s.cursor = Some(i);
        t.s.prev = prev;
        t.mark(i, ListMark::Visiting);
        if t.s.nodes[i].value == value {
            t.mark(i, ListMark::Removing);
            t.record(format!("Found {value}"));
            let next = t.s.nodes[i].next;
            match prev {
                Some(p) => {
                    t.s.nodes[p].next = next;
                    t.record(format!("{} skips over {value}", t.s.nodes[p].value));
                }
                None => {
                    t.s.head = next;
                    t.record("Head skips over the removed node");
                }
            }
            remove_slot(&mut t.s, i);
            return Ok(t.done(format!("{value} deleted")));
        }
        t.record(format!("{} is not {value}", t.s.nodes[i].value));
        prev = Some(i);
        at = t.s.nodes[i].next;
    }
    Ok(t.done(format!("{value} is not in the list")))
}

/// Drop arena slot `i` and renumber links above it.
fn remove_slot(s: &mut ListSnapshot, i: usize) {
    s.nodes.remove(i);
    let fix = |link: &mut Option<usize>| {
        if let Some(l) = link {
            if *l > i {
                *l -= 1;
            }
        }
    };
    for n in &mut s.nodes {
        fix(&mut n.next);
    }
    fix(&mut s.head);
}

pub fn search(list: &[i64], value: i64) -> Result<FrameSequence<ListSnapshot>> {
    let mut t = ListTrace::build(list, 0)?;
    t.record(format!("Search for {value}"));
    let mut at = t.s.head;
    let mut pos = 0usize;
    while let Some(i) = at {
        t.clear_marks();
        t.s.cursor = Some(i);
        if t.s.nodes[i].value == value {
            t.mark(i, ListMark::Found);
            t.record(format!("Found {value} at position {pos}"));
            return Ok(t.rec.finish());
        }
        t.mark(i, ListMark::Visiting);
        t.record(format!("{} is not {value}", t.s.nodes[i].value));
        at = t.s.nodes[i].next;
        pos += 1;
    }
    Ok(t.done(format!("{value} is not in the list")))
}

/// In-place reversal with prev/cursor/next pointers.
pub fn reverse(list: &[i64]) -> Result<FrameSequence<ListSnapshot>> {
    let mut t = ListTrace::build(list, 0)?;
    t.record("Reverse the list");
    let mut prev: Option<usize> = None;
    let mut at = t.s.head;
    while let Some(i) = at {
        let next = t.s.nodes[i].next;
        t.s.nodes[i].next = prev;
        t.clear_marks();
        t.s.cursor = Some(i);
        t.s.prev = prev;
        t.mark(i, ListMark::Visiting);
        t.record(format!("Point {} backwards", t.s.nodes[i].value));
        prev = Some(i);
        at = next;
    }
    t.s.head = prev;
    Ok(t.done("Head now points at the old tail"))
}
