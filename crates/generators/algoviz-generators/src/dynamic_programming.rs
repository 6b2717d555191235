//! Table-filling dynamic programming: one frame per cell.

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

/// Largest Fibonacci index whose value fits comfortably in an `i64`.
pub const MAX_FIBONACCI: usize = 90;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major; `None` until filled.
    pub cells: Vec<Option<i64>>,
    /// Cell being filled, as `(row, col)`.
    pub active: Option<(usize, usize)>,
    /// Cells the active cell was computed from.
    pub deps: Vec<(usize, usize)>,
    /// Answer cell, or the traceback path once the table is complete.
    pub highlight: Vec<(usize, usize)>,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub answer: Option<i64>,
    /// Reconstructed solution, where the problem has one.
    pub solution: Option<String>,
}

impl TableSnapshot {
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Cell count of a `rows` x `cols` table, if it fits the limits.
fn check_table(rows: usize, cols: usize) -> Result<usize> {
    let max = GeneratorLimits::default().max_table_cells;
    let cells = rows.saturating_mul(cols);
    if cells > max {
        return Err(GenerateError::too_large("table", cells, max));
    }
    Ok(cells)
}

struct TableTrace {
    s: TableSnapshot,
    rec: FrameRecorder<TableSnapshot>,
}

impl TableTrace {
    fn new(rows: usize, cols: usize, row_labels: Vec<String>, col_labels: Vec<String>) -> Result<Self> {
        let cells = check_table(rows, cols)?;
        Ok(Self {
            s: TableSnapshot {
                rows,
                cols,
                cells: vec![None; cells],
                active: None,
                deps: Vec::new(),
                highlight: Vec::new(),
                row_labels,
                col_labels,
                answer: None,
                solution: None,
            },
            rec: FrameRecorder::new(),
        })
    }

    /// Value of an already-filled cell.
    #[inline]
    fn at(&self, r: usize, c: usize) -> i64 {
        self.s.cells[r * self.s.cols + c].unwrap_or(0)
    }

    fn set(&mut self, r: usize, c: usize, v: i64) {
        let cols = self.s.cols;
        self.s.cells[r * cols + c] = Some(v);
    }

    fn fill(&mut self, r: usize, c: usize, v: i64, deps: Vec<(usize, usize)>, desc: impl Into<String>) {
        self.set(r, c, v);
        self.s.active = Some((r, c));
        self.s.deps = deps;
        self.rec.record(&self.s, desc);
    }

    fn record(&mut self, desc: impl Into<String>) {
        self.rec.record(&self.s, desc);
    }

    fn finish(
        mut self,
        answer_cell: (usize, usize),
        highlight: Vec<(usize, usize)>,
        solution: Option<String>,
        desc: impl Into<String>,
    ) -> FrameSequence<TableSnapshot> {
        self.s.active = None;
        self.s.deps.clear();
        self.s.answer = Some(self.at(answer_cell.0, answer_cell.1));
        self.s.highlight = if highlight.is_empty() {
            vec![answer_cell]
        } else {
            highlight
        };
        self.s.solution = solution;
        self.record(desc);
        self.rec.finish()
    }
}

fn char_labels(s: &[char]) -> Vec<String> {
    std::iter::once("ε".to_string())
        .chain(s.iter().map(|c| c.to_string()))
        .collect()
}

/// Bottom-up Fibonacci: one row, `n + 1` cells.
pub fn fibonacci_table(n: usize) -> Result<FrameSequence<TableSnapshot>> {
    if n > MAX_FIBONACCI {
        return Err(GenerateError::out_of_range(
            "n",
            n as i64,
            0,
            MAX_FIBONACCI as i64,
        ));
    }
    let labels = (0..=n).map(|i| format!("F({i})")).collect();
    let mut t = TableTrace::new(1, n + 1, vec!["F".to_string()], labels)?;
    t.record(format!("Compute F({n}) bottom-up"));
    t.fill(0, 0, 0, vec![], "F(0) = 0");
    if n >= 1 {
        t.fill(0, 1, 1, vec![], "F(1) = 1");
    }
    for i in 2..=n {
        let (a, b) = (t.at(0, i - 1), t.at(0, i - 2));
        t.fill(
            0,
            i,
            a + b,
            vec![(0, i - 1), (0, i - 2)],
            format!("F({i}) = F({}) + F({}) = {a} + {b} = {}", i - 1, i - 2, a + b),
        );
    }
    let v = t.at(0, n);
    Ok(t.finish((0, n), vec![], None, format!("F({n}) = {v}")))
}

fn check_text(what: &str, s: &str) -> Result<Vec<char>> {
    let chars: Vec<char> = s.chars().collect();
    let max = GeneratorLimits::default().max_array_len;
    if chars.len() > max {
        return Err(GenerateError::too_large(what, chars.len(), max));
    }
    Ok(chars)
}

/// Longest common subsequence, with a traceback of one optimal answer.
pub fn lcs(a: &str, b: &str) -> Result<FrameSequence<TableSnapshot>> {
    let a = check_text("first string", a)?;
    let b = check_text("second string", b)?;
    let (m, n) = (a.len(), b.len());
    let mut t = TableTrace::new(m + 1, n + 1, char_labels(&a), char_labels(&b))?;
    t.record("Longest common subsequence");
    for i in 0..=m {
        t.set(i, 0, 0);
    }
    for j in 0..=n {
        t.set(0, j, 0);
    }
    t.record("An empty prefix shares nothing: row 0 and column 0 are 0");

    for i in 1..=m {
        for j in 1..=n {
            if a[i - 1] == b[j - 1] {
                let v = t.at(i - 1, j - 1) + 1;
                t.fill(
                    i,
                    j,
                    v,
                    vec![(i - 1, j - 1)],
                    format!("'{}' matches: diagonal + 1 = {v}", a[i - 1]),
                );
            } else {
                let (up, left) = (t.at(i - 1, j), t.at(i, j - 1));
                let v = up.max(left);
                t.fill(
                    i,
                    j,
                    v,
                    vec![(i - 1, j), (i, j - 1)],
                    format!("'{}' vs '{}': max({up}, {left}) = {v}", a[i - 1], b[j - 1]),
                );
            }
        }
    }

    let (mut i, mut j) = (m, n);
    let mut path = vec![(i, j)];
    let mut out = Vec::new();
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            out.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if t.at(i - 1, j) >= t.at(i, j - 1) {
            i -= 1;
        } else {
            j -= 1;
        }
        path.push((i, j));
    }
    out.reverse();
    let sub: String = out.into_iter().collect();
    let len = t.at(m, n);
    let desc = format!("LCS length {len}: \"{sub}\"");
    Ok(t.finish((m, n), path, Some(sub), desc))
}

/// Levenshtein distance (insert, delete, substitute all cost 1).
pub fn edit_distance(a: &str, b: &str) -> Result<FrameSequence<TableSnapshot>> {
    let a = check_text("first string", a)?;
    let b = check_text("second string", b)?;
    let (m, n) = (a.len(), b.len());
    let mut t = TableTrace::new(m + 1, n + 1, char_labels(&a), char_labels(&b))?;
    t.record("Edit distance");
    for i in 0..=m {
        t.set(i, 0, i as i64);
    }
    for j in 0..=n {
        t.set(0, j, j as i64);
    }
    t.record("Turning a prefix into the empty string costs its length");

    for i in 1..=m {
        for j in 1..=n {
            let deps = vec![(i - 1, j - 1), (i - 1, j), (i, j - 1)];
            if a[i - 1] == b[j - 1] {
                let v = t.at(i - 1, j - 1);
                t.fill(i, j, v, deps, format!("'{}' matches: copy diagonal {v}", a[i - 1]));
            } else {
                let (sub, del, ins) = (t.at(i - 1, j - 1), t.at(i - 1, j), t.at(i, j - 1));
                let v = 1 + sub.min(del).min(ins);
                t.fill(
                    i,
                    j,
                    v,
                    deps,
                    format!("'{}' vs '{}': 1 + min({sub}, {del}, {ins}) = {v}", a[i - 1], b[j - 1]),
                );
            }
        }
    }
    let v = t.at(m, n);
    Ok(t.finish((m, n), vec![], None, format!("Edit distance is {v}")))
}

/// 0/1 knapsack. Row `i` considers the first `i` items; column `w` is the
/// capacity in use.
pub fn knapsack(
    weights: &[usize],
    values: &[i64],
    capacity: usize,
) -> Result<FrameSequence<TableSnapshot>> {
    if weights.is_empty() {
        return Err(GenerateError::empty("items"));
    }
    if weights.len() != values.len() {
        return Err(GenerateError::malformed(format!(
            "{} weights but {} values",
            weights.len(),
            values.len()
        )));
    }
    let limits = GeneratorLimits::default();
    limits.check_nodes("items", weights.len())?;
    limits.check_values("values", values)?;
    if let Some(v) = values.iter().find(|&&v| v < 0) {
        return Err(GenerateError::out_of_range("value", *v, 0, limits.max_abs_value));
    }

    let n = weights.len();
    check_table(n + 1, capacity.saturating_add(1))?;
    let row_labels = std::iter::once("none".to_string())
        .chain(
            weights
                .iter()
                .zip(values)
                .enumerate()
                .map(|(i, (w, v))| format!("#{} w={w} v={v}", i + 1)),
        )
        .collect();
    let col_labels = (0..=capacity).map(|w| w.to_string()).collect();
    let mut t = TableTrace::new(n + 1, capacity + 1, row_labels, col_labels)?;
    t.record(format!("Knapsack with capacity {capacity}"));
    for w in 0..=capacity {
        t.set(0, w, 0);
    }
    t.record("With no items the best value is 0");

    for i in 1..=n {
        let (wi, vi) = (weights[i - 1], values[i - 1]);
        for w in 0..=capacity {
            let skip = t.at(i - 1, w);
            if wi > w {
                t.fill(
                    i,
                    w,
                    skip,
                    vec![(i - 1, w)],
                    format!("Item {i} (w={wi}) does not fit in {w}: keep {skip}"),
                );
                continue;
            }
            let take = vi + t.at(i - 1, w - wi);
            let v = skip.max(take);
            t.fill(
                i,
                w,
                v,
                vec![(i - 1, w), (i - 1, w - wi)],
                format!("Item {i} at capacity {w}: max(skip {skip}, take {take}) = {v}"),
            );
        }
    }

    let mut chosen = Vec::new();
    let mut path = Vec::new();
    let mut w = capacity;
    for i in (1..=n).rev() {
        path.push((i, w));
        if t.at(i, w) != t.at(i - 1, w) {
            chosen.push(i);
            w -= weights[i - 1];
        }
    }
    path.push((0, w));
    chosen.reverse();
    let best = t.at(n, capacity);
    let list = chosen
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let solution = format!("items {list}");
    let desc = if chosen.is_empty() {
        "Nothing fits: best value 0".to_string()
    } else {
        format!("Best value {best} using {solution}")
    };
    Ok(t.finish((n, capacity), path, Some(solution), desc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(frames: &FrameSequence<TableSnapshot>) -> &TableSnapshot {
        &frames.last().unwrap().snapshot
    }

    #[test]
    fn fibonacci() {
        let frames = fibonacci_table(10).unwrap();
        assert_eq!(last(&frames).answer, Some(55));
        // intro + 11 fills + answer
        assert_eq!(frames.len(), 13);
        assert_eq!(last(&frames).highlight, vec![(0, 10)]);

        assert_eq!(last(&fibonacci_table(0).unwrap()).answer, Some(0));
        assert_eq!(
            last(&fibonacci_table(90).unwrap()).answer,
            Some(2_880_067_194_370_816_120)
        );
        assert!(matches!(
            fibonacci_table(91),
            Err(GenerateError::OutOfRange { .. })
        ));
    }

    #[test]
    fn lcs_with_traceback() {
        let frames = lcs("ABCBDAB", "BDCABA").unwrap();
        let snap = last(&frames);
        assert_eq!(snap.answer, Some(4));
        let sub = snap.solution.clone().unwrap();
        assert_eq!(sub.len(), 4);
        assert_eq!(snap.highlight.first(), Some(&(7, 6)));
        assert_eq!(snap.filled(), 8 * 7);
    }

    #[test]
    fn lcs_frames_fill_one_cell_each() {
        let frames = lcs("AB", "AB").unwrap();
        // intro, base row/col, 4 fills, answer
        assert_eq!(frames.len(), 7);
        for pair in frames.iter().collect::<Vec<_>>().windows(2).skip(1).take(4) {
            assert_eq!(pair[1].snapshot.filled(), pair[0].snapshot.filled() + 1);
        }
    }

    #[test]
    fn edit_distance_classic() {
        assert_eq!(last(&edit_distance("kitten", "sitting").unwrap()).answer, Some(3));
        assert_eq!(last(&edit_distance("", "abc").unwrap()).answer, Some(3));
        assert_eq!(last(&edit_distance("same", "same").unwrap()).answer, Some(0));
    }

    #[test]
    fn knapsack_picks_items() {
        let frames = knapsack(&[1, 3, 4, 5], &[1, 4, 5, 7], 7).unwrap();
        let snap = last(&frames);
        assert_eq!(snap.answer, Some(9));
        assert_eq!(snap.solution.as_deref(), Some("items 2, 3"));
    }

    #[test]
    fn knapsack_validation() {
        assert!(matches!(knapsack(&[], &[], 3), Err(GenerateError::EmptyInput { .. })));
        assert!(matches!(knapsack(&[1], &[1, 2], 3), Err(GenerateError::Malformed { .. })));
        assert!(matches!(
            knapsack(&[1], &[1], 5_000),
            Err(GenerateError::InputTooLarge { .. })
        ));
        assert!(matches!(
            knapsack(&[1], &[1], usize::MAX),
            Err(GenerateError::InputTooLarge { .. })
        ));
    }
}
