//! Frames, frame sequences, and the recorder generators build them with.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One step of an algorithm run: a snapshot of its state plus a caption.
///
/// Frames are never mutated after they are produced. The player only hands
/// out shared references or clones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame<S> {
    pub snapshot: S,
    pub description: String,
}

impl<S> Frame<S> {
    pub fn new(snapshot: S, description: impl Into<String>) -> Self {
        Self {
            snapshot,
            description: description.into(),
        }
    }
}

/// The complete, precomputed list of frames for one algorithm run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSequence<S> {
    frames: Vec<Frame<S>>,
}

impl<S> Default for FrameSequence<S> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<S> FrameSequence<S> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Frame<S>> {
        self.frames.get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&Frame<S>> {
        self.frames.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&Frame<S>> {
        self.frames.last()
    }

    /// Index of the final frame, `None` when empty.
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn push(&mut self, frame: Frame<S>) {
        self.frames.push(frame);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame<S>> {
        self.frames.iter()
    }

    /// Snapshots in display order.
    pub fn snapshots(&self) -> impl Iterator<Item = &S> {
        self.frames.iter().map(|f| &f.snapshot)
    }

    pub fn into_vec(self) -> Vec<Frame<S>> {
        self.frames
    }
}

impl<S> Index<usize> for FrameSequence<S> {
    type Output = Frame<S>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl<S> From<Vec<Frame<S>>> for FrameSequence<S> {
    fn from(frames: Vec<Frame<S>>) -> Self {
        Self { frames }
    }
}

impl<S> FromIterator<Frame<S>> for FrameSequence<S> {
    fn from_iter<I: IntoIterator<Item = Frame<S>>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<S> IntoIterator for FrameSequence<S> {
    type Item = Frame<S>;
    type IntoIter = std::vec::IntoIter<Frame<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a, S> IntoIterator for &'a FrameSequence<S> {
    type Item = &'a Frame<S>;
    type IntoIter = std::slice::Iter<'a, Frame<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Accumulator passed through generator code.
///
/// `record` clones the working state, so a generator can keep mutating its
/// state after recording without touching frames already captured.
#[derive(Debug)]
pub struct FrameRecorder<S> {
    frames: Vec<Frame<S>>,
}

impl<S> Default for FrameRecorder<S> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<S: Clone> FrameRecorder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a deep copy of `state`.
    pub fn record(&mut self, state: &S, description: impl Into<String>) {
        self.frames.push(Frame::new(state.clone(), description));
    }
}

impl<S> FrameRecorder<S> {
    /// Capture an already-owned snapshot without cloning.
    pub fn push(&mut self, snapshot: S, description: impl Into<String>) {
        self.frames.push(Frame::new(snapshot, description));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Most recently recorded frame, if any.
    pub fn last(&self) -> Option<&Frame<S>> {
        self.frames.last()
    }

    pub fn finish(self) -> FrameSequence<S> {
        FrameSequence::from(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_copies_state() {
        let mut state = vec![3, 1, 2];
        let mut rec = FrameRecorder::new();
        rec.record(&state, "start");
        state.swap(0, 1);
        rec.record(&state, "swap");
        state.clear();
        let seq = rec.finish();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].snapshot, vec![3, 1, 2]);
        assert_eq!(seq[1].snapshot, vec![1, 3, 2]);
    }

    #[test]
    fn last_index_on_empty() {
        let seq: FrameSequence<u8> = FrameSequence::new();
        assert_eq!(seq.last_index(), None);
        assert!(seq.is_empty());
    }

    #[test]
    fn serializes_as_plain_array() {
        let seq: FrameSequence<i32> = vec![Frame::new(1, "one"), Frame::new(2, "two")].into();
        let json = serde_json::to_value(&seq).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["snapshot"], 2);
        let back: FrameSequence<i32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, seq);
    }
}
