//! Linear and binary search.

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub items: Vec<i64>,
    pub target: i64,
    /// Inclusive window still under consideration (binary search only).
    pub low: Option<usize>,
    pub high: Option<usize>,
    pub mid: Option<usize>,
    /// Index being compared against the target.
    pub probe: Option<usize>,
    /// Indices ruled out so far.
    pub eliminated: Vec<bool>,
    pub found: Option<usize>,
}

impl SearchSnapshot {
    fn new(items: &[i64], target: i64) -> Self {
        Self {
            items: items.to_vec(),
            target,
            low: None,
            high: None,
            mid: None,
            probe: None,
            eliminated: vec![false; items.len()],
            found: None,
        }
    }
}

pub fn linear_search(values: &[i64], target: i64) -> Result<FrameSequence<SearchSnapshot>> {
    let limits = GeneratorLimits::default();
    limits.check_array("array", values)?;
    limits.check_value("target", target)?;

    let mut s = SearchSnapshot::new(values, target);
    let mut rec = FrameRecorder::new();
    rec.record(&s, format!("Look for {target} from left to right"));

    for (i, &v) in values.iter().enumerate() {
        s.probe = Some(i);
        if v == target {
            s.found = Some(i);
            rec.record(&s, format!("Found {target} at index {i}"));
            return Ok(rec.finish());
        }
        rec.record(&s, format!("{v} at index {i} is not {target}"));
        s.eliminated[i] = true;
    }
    s.probe = None;
    rec.record(&s, format!("{target} is not in the array"));
    Ok(rec.finish())
}

/// Requires `values` in non-decreasing order.
pub fn binary_search(values: &[i64], target: i64) -> Result<FrameSequence<SearchSnapshot>> {
    let limits = GeneratorLimits::default();
    limits.check_array("array", values)?;
    limits.check_value("target", target)?;
    if let Some(i) = values.windows(2).position(|w| w[0] > w[1]) {
        return Err(GenerateError::malformed(format!(
            "binary search needs sorted input, but {} at index {} is followed by {}",
            values[i],
            i,
            values[i + 1]
        )));
    }

    let mut s = SearchSnapshot::new(values, target);
    let mut rec = FrameRecorder::new();
    let (mut low, mut high) = (0usize, values.len() - 1);
    s.low = Some(low);
    s.high = Some(high);
    rec.record(&s, format!("Search for {target} in indices {low}..={high}"));

    loop {
        let mid = low + (high - low) / 2;
        let v = values[mid];
        s.mid = Some(mid);
        s.probe = Some(mid);
        if v == target {
            s.found = Some(mid);
            rec.record(&s, format!("Middle value {v} at index {mid} is the target"));
            return Ok(rec.finish());
        }
        if v < target {
            rec.record(&s, format!("{v} < {target}: discard the left half"));
            s.eliminated[low..=mid].iter_mut().for_each(|e| *e = true);
            if mid == high {
                break;
            }
            low = mid + 1;
        } else {
            rec.record(&s, format!("{v} > {target}: discard the right half"));
            s.eliminated[mid..=high].iter_mut().for_each(|e| *e = true);
            if mid == low {
                break;
            }
            high = mid - 1;
        }
        s.low = Some(low);
        s.high = Some(high);
    }

    s.low = None;
    s.high = None;
    s.mid = None;
    s.probe = None;
    rec.record(&s, format!("{target} is not in the array"));
    Ok(rec.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_finds_first_match() {
        let frames = linear_search(&[4, 8, 15, 8], 8).unwrap();
        let last = &frames.last().unwrap().snapshot;
        assert_eq!(last.found, Some(1));
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn linear_miss_eliminates_everything() {
        let frames = linear_search(&[1, 2, 3], 9).unwrap();
        let last = &frames.last().unwrap().snapshot;
        assert_eq!(last.found, None);
        assert!(last.eliminated.iter().all(|&e| e));
        assert_eq!(frames.last().unwrap().description, "9 is not in the array");
    }

    #[test]
    fn binary_probes_midpoints() {
        let frames = binary_search(&[1, 3, 5, 7, 9], 7).unwrap();
        let mids: Vec<usize> = frames.snapshots().filter_map(|s| s.mid).collect();
        assert_eq!(mids, vec![2, 3]);
        assert_eq!(frames.last().unwrap().snapshot.found, Some(3));
    }

    #[test]
    fn binary_miss() {
        for target in [0, 4, 10] {
            let frames = binary_search(&[1, 3, 5, 7, 9], target).unwrap();
            let last = &frames.last().unwrap().snapshot;
            assert_eq!(last.found, None);
            assert!(last.eliminated.iter().all(|&e| e), "target {target}");
        }
    }

    #[test]
    fn binary_rejects_unsorted() {
        assert!(matches!(
            binary_search(&[1, 5, 3], 3),
            Err(GenerateError::Malformed { .. })
        ));
        assert!(matches!(
            binary_search(&[], 3),
            Err(GenerateError::EmptyInput { .. })
        ));
    }
}
