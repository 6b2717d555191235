//! Binary heap operations on an array-backed heap.

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapKind {
    Min,
    Max,
}

impl HeapKind {
    /// Whether `a` belongs above `b`.
    #[inline]
    fn above(self, a: i64, b: i64) -> bool {
        match self {
            Self::Min => a < b,
            Self::Max => a > b,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapSnapshot {
    pub items: Vec<i64>,
    pub highlight: Vec<usize>,
    pub kind: HeapKind,
    /// Value removed by an extract, once it has left the heap.
    pub extracted: Option<i64>,
}

impl HeapSnapshot {
    /// True when every parent sits correctly above its children.
    pub fn is_valid(&self) -> bool {
        first_violation(&self.items, self.kind).is_none()
    }
}

fn first_violation(items: &[i64], kind: HeapKind) -> Option<usize> {
    (1..items.len()).find(|&i| kind.above(items[i], items[(i - 1) / 2]))
}

struct HeapTrace {
    s: HeapSnapshot,
    rec: FrameRecorder<HeapSnapshot>,
}

impl HeapTrace {
    fn new(items: &[i64], kind: HeapKind) -> Self {
        Self {
            s: HeapSnapshot {
                items: items.to_vec(),
                highlight: Vec::new(),
                kind,
                extracted: None,
            },
            rec: FrameRecorder::new(),
        }
    }

    fn record(&mut self, highlight: &[usize], desc: impl Into<String>) {
        self.s.highlight = highlight.to_vec();
        self.rec.record(&self.s, desc);
    }

    fn sift_up(&mut self, mut i: usize) {
        let kind = self.s.kind;
        while i > 0 {
            let p = (i - 1) / 2;
            let (child, parent) = (self.s.items[i], self.s.items[p]);
            if !kind.above(child, parent) {
                self.record(&[i, p], format!("{child} can stay below {parent}"));
                return;
            }
            self.s.items.swap(i, p);
            self.record(&[p, i], format!("{child} moves above {parent}"));
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize, len: usize) {
        let kind = self.s.kind;
        loop {
            let (l, r) = (2 * i + 1, 2 * i + 2);
            if l >= len {
                return;
            }
            let mut best = l;
            if r < len && kind.above(self.s.items[r], self.s.items[l]) {
                best = r;
            }
            let (v, c) = (self.s.items[i], self.s.items[best]);
            if !kind.above(c, v) {
                self.record(&[i, best], format!("{v} is already above {c}"));
                return;
            }
            self.s.items.swap(i, best);
            self.record(&[best, i], format!("{v} sinks below {c}"));
            i = best;
        }
    }

    fn finish(mut self, desc: impl Into<String>) -> FrameSequence<HeapSnapshot> {
        self.record(&[], desc);
        self.rec.finish()
    }
}

fn check_heap(heap: &[i64], kind: HeapKind, extra: usize) -> Result<()> {
    let limits = GeneratorLimits::default();
    limits.check_nodes("heap", heap.len() + extra)?;
    limits.check_values("heap", heap)?;
    if let Some(i) = first_violation(heap, kind) {
        return Err(GenerateError::malformed(format!(
            "not a {}-heap: {} at index {i} sits below {}",
            kind.label(),
            heap[i],
            heap[(i - 1) / 2]
        )));
    }
    Ok(())
}

pub fn heap_insert(heap: &[i64], value: i64, kind: HeapKind) -> Result<FrameSequence<HeapSnapshot>> {
    check_heap(heap, kind, 1)?;
    GeneratorLimits::default().check_value("value", value)?;
    let mut t = HeapTrace::new(heap, kind);
    t.record(&[], format!("Insert {value} into the {}-heap", kind.label()));
    t.s.items.push(value);
    let at = t.s.items.len() - 1;
    t.record(&[at], format!("Append {value} at index {at}"));
    t.sift_up(at);
    Ok(t.finish(format!("Inserted {value}")))
}

/// Remove the root.
pub fn heap_extract(heap: &[i64], kind: HeapKind) -> Result<FrameSequence<HeapSnapshot>> {
    if heap.is_empty() {
        return Err(GenerateError::empty("heap"));
    }
    check_heap(heap, kind, 0)?;
    let mut t = HeapTrace::new(heap, kind);
    let top = heap[0];
    t.record(&[0], format!("Extract the {} value {top}", kind.label()));

    let last = t.s.items.len() - 1;
    t.s.items.swap(0, last);
    t.s.items.pop();
    t.s.extracted = Some(top);
    if t.s.items.is_empty() {
        return Ok(t.finish(format!("Extracted {top}; heap is empty")));
    }
    let moved = t.s.items[0];
    t.record(&[0], format!("Move the last value {moved} to the root"));
    let len = t.s.items.len();
    t.sift_down(0, len);
    Ok(t.finish(format!("Extracted {top}")))
}

/// Floyd's bottom-up heap construction.
pub fn build_heap(values: &[i64], kind: HeapKind) -> Result<FrameSequence<HeapSnapshot>> {
    let limits = GeneratorLimits::default();
    if values.is_empty() {
        return Err(GenerateError::empty("heap"));
    }
    limits.check_nodes("heap", values.len())?;
    limits.check_values("heap", values)?;

    let mut t = HeapTrace::new(values, kind);
    t.record(&[], format!("Build a {}-heap bottom-up", kind.label()));
    let len = values.len();
    for i in (0..len / 2).rev() {
        t.record(&[i], format!("Sift down {} at index {i}", t.s.items[i]));
        t.sift_down(i, len);
    }
    Ok(t.finish("Heap built"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(frames: &FrameSequence<HeapSnapshot>) -> &HeapSnapshot {
        &frames.last().unwrap().snapshot
    }

    #[test]
    fn insert_sifts_up() {
        let frames = heap_insert(&[1, 3, 2, 7, 4], 0, HeapKind::Min).unwrap();
        let snap = last(&frames);
        assert_eq!(snap.items[0], 0);
        assert!(snap.is_valid());

        let frames = heap_insert(&[9, 5, 8], 6, HeapKind::Max).unwrap();
        assert_eq!(last(&frames).items, vec![9, 6, 8, 5]);
    }

    #[test]
    fn extract_sifts_down() {
        let frames = heap_extract(&[1, 3, 2, 7, 4], HeapKind::Min).unwrap();
        let snap = last(&frames);
        assert_eq!(snap.extracted, Some(1));
        assert_eq!(snap.items.len(), 4);
        assert_eq!(snap.items[0], 2);
        assert!(snap.is_valid());

        let frames = heap_extract(&[5], HeapKind::Max).unwrap();
        assert!(last(&frames).items.is_empty());
    }

    #[test]
    fn extract_from_empty() {
        assert!(matches!(
            heap_extract(&[], HeapKind::Min),
            Err(GenerateError::EmptyInput { .. })
        ));
    }

    #[test]
    fn rejects_non_heap_input() {
        assert!(matches!(
            heap_insert(&[5, 1], 3, HeapKind::Min),
            Err(GenerateError::Malformed { .. })
        ));
    }

    #[test]
    fn floyd_build() {
        for kind in [HeapKind::Min, HeapKind::Max] {
            let frames = build_heap(&[9, 4, 7, 1, 8, 2, 6, 3], kind).unwrap();
            let snap = last(&frames);
            assert!(snap.is_valid());
            let mut sorted = snap.items.clone();
            sorted.sort();
            assert_eq!(sorted, vec![1, 2, 3, 4, 6, 7, 8, 9]);
        }
    }
}
