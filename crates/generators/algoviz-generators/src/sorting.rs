//! Sorting generators.
//!
//! Every generator narrates one comparison per `Compare` frame and one swap
//! per `Swap` frame, and keeps running counters in the snapshot so a
//! side-by-side comparison can read them off the last frame.

use std::cmp::Ordering;

use algoviz_player_core::{FrameRecorder, FrameSequence};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarState {
    Idle,
    Comparing,
    Swapping,
    Pivot,
    Sorted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub value: i64,
    pub state: BarState,
}

/// What the frame shows happening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAction {
    Start,
    Compare,
    Swap,
    Overwrite,
    Pivot,
    MarkSorted,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySnapshot {
    pub bars: Vec<Bar>,
    pub action: SortAction,
    pub comparisons: usize,
    pub swaps: usize,
}

impl ArraySnapshot {
    pub fn values(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.value).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 6] = [
        Self::Bubble,
        Self::Selection,
        Self::Insertion,
        Self::Merge,
        Self::Quick,
        Self::Heap,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Selection => "selection",
            Self::Insertion => "insertion",
            Self::Merge => "merge",
            Self::Quick => "quick",
            Self::Heap => "heap",
        }
    }
}

impl std::str::FromStr for SortAlgorithm {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| GenerateError::malformed(format!("unknown sort algorithm '{s}'")))
    }
}

/// Run `algorithm` over `input` with default limits.
pub fn generate_sort(
    algorithm: SortAlgorithm,
    input: &[i64],
) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort_with_limits(algorithm, input, &GeneratorLimits::default())
}

pub fn generate_sort_with_limits(
    algorithm: SortAlgorithm,
    input: &[i64],
    limits: &GeneratorLimits,
) -> Result<FrameSequence<ArraySnapshot>> {
    limits.check_array("array", input)?;
    let mut t = SortTrace::new(input);
    match algorithm {
        SortAlgorithm::Bubble => bubble(&mut t),
        SortAlgorithm::Selection => selection(&mut t),
        SortAlgorithm::Insertion => insertion(&mut t),
        SortAlgorithm::Merge => {
            let n = t.len();
            merge_sort_range(&mut t, 0, n - 1)
        }
        SortAlgorithm::Quick => {
            let n = t.len();
            quick_sort_range(&mut t, 0, n - 1)
        }
        SortAlgorithm::Heap => heap(&mut t),
    }
    Ok(t.finish())
}

pub fn bubble_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Bubble, input)
}

pub fn selection_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Selection, input)
}

pub fn insertion_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Insertion, input)
}

pub fn merge_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Merge, input)
}

/// Lomuto partition with the last element as pivot.
pub fn quick_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Quick, input)
}

pub fn heap_sort(input: &[i64]) -> Result<FrameSequence<ArraySnapshot>> {
    generate_sort(SortAlgorithm::Heap, input)
}

/// Number of frames in `frames` showing `action`.
pub fn count_actions(frames: &FrameSequence<ArraySnapshot>, action: SortAction) -> usize {
    frames
        .snapshots()
        .filter(|s| s.action == action)
        .count()
}

/// Seeded random input in `1..=max`. Same seed, same array.
pub fn random_array(len: usize, max: i64, seed: u64) -> Result<Vec<i64>> {
    let limits = GeneratorLimits::default();
    if len == 0 {
        return Err(GenerateError::empty("array"));
    }
    if len > limits.max_array_len {
        return Err(GenerateError::too_large("array", len, limits.max_array_len));
    }
    if !(1..=limits.max_abs_value).contains(&max) {
        return Err(GenerateError::out_of_range(
            "max",
            max,
            1,
            limits.max_abs_value,
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..len).map(|_| rng.gen_range(1..=max)).collect())
}

/// Working array plus the recorder it narrates into.
struct SortTrace {
    state: ArraySnapshot,
    sorted: Vec<bool>,
    pivot: Option<usize>,
    rec: FrameRecorder<ArraySnapshot>,
}

impl SortTrace {
    fn new(input: &[i64]) -> Self {
        let mut t = Self {
            state: ArraySnapshot {
                bars: input
                    .iter()
                    .map(|&value| Bar {
                        value,
                        state: BarState::Idle,
                    })
                    .collect(),
                action: SortAction::Start,
                comparisons: 0,
                swaps: 0,
            },
            sorted: vec![false; input.len()],
            pivot: None,
            rec: FrameRecorder::new(),
        };
        t.rec
            .record(&t.state, format!("Start with {} elements", input.len()));
        t
    }

    #[inline]
    fn len(&self) -> usize {
        self.state.bars.len()
    }

    #[inline]
    fn value(&self, i: usize) -> i64 {
        self.state.bars[i].value
    }

    fn paint(&mut self, marks: &[(usize, BarState)], action: SortAction) {
        for (k, bar) in self.state.bars.iter_mut().enumerate() {
            bar.state = if self.sorted[k] {
                BarState::Sorted
            } else if self.pivot == Some(k) {
                BarState::Pivot
            } else {
                BarState::Idle
            };
        }
        for &(k, s) in marks {
            self.state.bars[k].state = s;
        }
        self.state.action = action;
    }

    /// Compare the values at `i` and `j`.
    fn compare(&mut self, i: usize, j: usize) -> Ordering {
        let (a, b) = (self.value(i), self.value(j));
        self.state.comparisons += 1;
        self.paint(
            &[(i, BarState::Comparing), (j, BarState::Comparing)],
            SortAction::Compare,
        );
        self.rec
            .record(&self.state, format!("Compare {a} (index {i}) with {b} (index {j})"));
        a.cmp(&b)
    }

    /// Compare two values that are not (yet) in the array, highlighting `at`.
    fn compare_values(&mut self, at: usize, a: i64, b: i64) -> Ordering {
        self.state.comparisons += 1;
        self.paint(&[(at, BarState::Comparing)], SortAction::Compare);
        self.rec.record(&self.state, format!("Compare {a} with {b}"));
        a.cmp(&b)
    }

    fn swap(&mut self, i: usize, j: usize) {
        let (a, b) = (self.value(i), self.value(j));
        self.state.bars.swap(i, j);
        self.state.swaps += 1;
        self.paint(
            &[(i, BarState::Swapping), (j, BarState::Swapping)],
            SortAction::Swap,
        );
        self.rec
            .record(&self.state, format!("Swap {a} (index {i}) with {b} (index {j})"));
    }

    fn overwrite(&mut self, i: usize, value: i64) {
        self.state.bars[i].value = value;
        self.paint(&[(i, BarState::Swapping)], SortAction::Overwrite);
        self.rec
            .record(&self.state, format!("Write {value} to index {i}"));
    }

    fn set_pivot(&mut self, i: usize) {
        self.pivot = Some(i);
        self.paint(&[], SortAction::Pivot);
        let v = self.value(i);
        self.rec
            .record(&self.state, format!("Pivot is {v} (index {i})"));
    }

    fn mark_sorted(&mut self, i: usize) {
        self.sorted[i] = true;
        if self.pivot == Some(i) {
            self.pivot = None;
        }
        self.paint(&[], SortAction::MarkSorted);
        let v = self.value(i);
        self.rec
            .record(&self.state, format!("{v} is in its final position (index {i})"));
    }

    fn finish(mut self) -> FrameSequence<ArraySnapshot> {
        self.sorted.iter_mut().for_each(|s| *s = true);
        self.pivot = None;
        self.paint(&[], SortAction::Done);
        let desc = format!(
            "Sorted: {} comparisons, {} swaps",
            self.state.comparisons, self.state.swaps
        );
        self.rec.record(&self.state, desc);
        self.rec.finish()
    }
}

fn bubble(t: &mut SortTrace) {
    let n = t.len();
    for pass in 0..n.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..n - 1 - pass {
            if t.compare(j, j + 1) == Ordering::Greater {
                t.swap(j, j + 1);
                swapped = true;
            }
        }
        t.mark_sorted(n - 1 - pass);
        if !swapped {
            break;
        }
    }
}

fn selection(t: &mut SortTrace) {
    let n = t.len();
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            if t.compare(j, min) == Ordering::Less {
                min = j;
            }
        }
        if min != i {
            t.swap(i, min);
        }
        t.mark_sorted(i);
    }
}

fn insertion(t: &mut SortTrace) {
    for i in 1..t.len() {
        let mut j = i;
        while j > 0 && t.compare(j - 1, j) == Ordering::Greater {
            t.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn merge_sort_range(t: &mut SortTrace, lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    merge_sort_range(t, lo, mid);
    merge_sort_range(t, mid + 1, hi);

    let left: Vec<i64> = (lo..=mid).map(|k| t.value(k)).collect();
    let right: Vec<i64> = (mid + 1..=hi).map(|k| t.value(k)).collect();
    let (mut i, mut j, mut k) = (0, 0, lo);
    while i < left.len() && j < right.len() {
        // Ties take from the left run so the sort stays stable.
        if t.compare_values(k, left[i], right[j]) != Ordering::Greater {
            t.overwrite(k, left[i]);
            i += 1;
        } else {
            t.overwrite(k, right[j]);
            j += 1;
        }
        k += 1;
    }
    for &v in left[i..].iter().chain(&right[j..]) {
        t.overwrite(k, v);
        k += 1;
    }
}

fn quick_sort_range(t: &mut SortTrace, lo: usize, hi: usize) {
    if lo > hi {
        return;
    }
    if lo == hi {
        t.mark_sorted(lo);
        return;
    }
    let p = partition(t, lo, hi);
    if p > lo {
        quick_sort_range(t, lo, p - 1);
    }
    quick_sort_range(t, p + 1, hi);
}

fn partition(t: &mut SortTrace, lo: usize, hi: usize) -> usize {
    t.set_pivot(hi);
    let mut i = lo;
    for j in lo..hi {
        if t.compare(j, hi) != Ordering::Greater {
            if i != j {
                t.swap(i, j);
            }
            i += 1;
        }
    }
    if i != hi {
        t.pivot = Some(i);
        t.swap(i, hi);
    }
    t.mark_sorted(i);
    i
}

fn heap(t: &mut SortTrace) {
    let n = t.len();
    for i in (0..n / 2).rev() {
        sift_down(t, i, n);
    }
    for end in (1..n).rev() {
        t.swap(0, end);
        t.mark_sorted(end);
        sift_down(t, 0, end);
    }
    t.mark_sorted(0);
}

fn sift_down(t: &mut SortTrace, mut i: usize, n: usize) {
    loop {
        let mut largest = i;
        let (l, r) = (2 * i + 1, 2 * i + 2);
        if l < n && t.compare(l, largest) == Ordering::Greater {
            largest = l;
        }
        if r < n && t.compare(r, largest) == Ordering::Greater {
            largest = r;
        }
        if largest == i {
            return;
        }
        t.swap(i, largest);
        i = largest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(frames: &FrameSequence<ArraySnapshot>) -> &ArraySnapshot {
        &frames.last().unwrap().snapshot
    }

    #[test]
    fn every_algorithm_sorts() {
        let input = [5, -3, 9, 0, 9, 2, 7, -3, 4];
        let mut expected = input.to_vec();
        expected.sort();
        for algo in SortAlgorithm::ALL {
            let frames = generate_sort(algo, &input).unwrap();
            let done = last(&frames);
            assert_eq!(done.values(), expected, "{}", algo.name());
            assert_eq!(done.action, SortAction::Done);
            assert!(done.bars.iter().all(|b| b.state == BarState::Sorted));
            assert_eq!(frames[0].snapshot.action, SortAction::Start);
            assert_eq!(frames[0].snapshot.values(), input.to_vec());
        }
    }

    #[test]
    fn swap_counter_matches_swap_frames() {
        let input = [4, 1, 3, 9, 7, 2];
        for algo in SortAlgorithm::ALL {
            let frames = generate_sort(algo, &input).unwrap();
            assert_eq!(
                last(&frames).swaps,
                count_actions(&frames, SortAction::Swap),
                "{}",
                algo.name()
            );
            assert_eq!(
                last(&frames).comparisons,
                count_actions(&frames, SortAction::Compare),
                "{}",
                algo.name()
            );
        }
    }

    #[test]
    fn single_element_is_start_and_done() {
        for algo in SortAlgorithm::ALL {
            let frames = generate_sort(algo, &[42]).unwrap();
            assert_eq!(last(&frames).values(), vec![42]);
            assert_eq!(last(&frames).swaps, 0);
        }
    }

    #[test]
    fn bubble_stops_early_on_sorted_input() {
        let frames = bubble_sort(&[1, 2, 3, 4]).unwrap();
        assert_eq!(count_actions(&frames, SortAction::Compare), 3);
        assert_eq!(count_actions(&frames, SortAction::Swap), 0);
    }

    #[test]
    fn merge_sort_overwrites_instead_of_swapping() {
        let frames = merge_sort(&[3, 1, 2]).unwrap();
        assert_eq!(count_actions(&frames, SortAction::Swap), 0);
        assert!(count_actions(&frames, SortAction::Overwrite) > 0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            bubble_sort(&[]),
            Err(GenerateError::EmptyInput { .. })
        ));
        let limits = GeneratorLimits {
            max_array_len: 3,
            ..GeneratorLimits::default()
        };
        assert!(matches!(
            generate_sort_with_limits(SortAlgorithm::Quick, &[1, 2, 3, 4], &limits),
            Err(GenerateError::InputTooLarge { len: 4, max: 3, .. })
        ));
    }

    #[test]
    fn input_is_untouched_and_output_deterministic() {
        let input = vec![9, 4, 7, 1];
        let a = quick_sort(&input).unwrap();
        let b = quick_sort(&input).unwrap();
        assert_eq!(a, b);
        assert_eq!(input, vec![9, 4, 7, 1]);
    }

    #[test]
    fn random_array_is_seeded() {
        let a = random_array(20, 100, 7).unwrap();
        assert_eq!(a, random_array(20, 100, 7).unwrap());
        assert!(a.iter().all(|v| (1..=100).contains(v)));
        assert!(random_array(0, 10, 1).is_err());
        assert!(random_array(5, 0, 1).is_err());
    }

    #[test]
    fn algorithm_names_parse() {
        for algo in SortAlgorithm::ALL {
            assert_eq!(algo.name().parse::<SortAlgorithm>().unwrap(), algo);
        }
        assert!("bogo".parse::<SortAlgorithm>().is_err());
    }
}
