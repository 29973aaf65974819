//! Boolean masks to contact intervals, and the minimum-duration filter.
use hifitime::{Duration, Epoch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::TimeGrid;

/// One maximal run of asserted mask samples.
///
/// `start` is the grid instant of the rising edge: the last false sample
/// before the run, or the first grid instant when the run opens the grid.
/// `end` is the instant of the last true sample.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactInterval {
    /// Grid index of the rising edge.
    pub start_idx: usize,

    /// Grid index of the last asserted sample.
    pub end_idx: usize,

    /// Instant of the rising edge.
    pub start: Epoch,

    /// Instant of the last asserted sample.
    pub end: Epoch,
}

impl ContactInterval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Extracts one [ContactInterval] per maximal run of true samples.
///
/// Boundary behavior:
/// - all false: empty list,
/// - all true: a single interval spanning the whole grid,
/// - a run opening the grid starts at the first grid instant,
/// - a run closing the grid ends at the last grid instant.
pub fn true_intervals(mask: &[bool], grid: &TimeGrid) -> Vec<ContactInterval> {
    assert_eq!(mask.len(), grid.len(), "mask must align with its grid");

    let mut intervals = Vec::new();
    if mask.is_empty() {
        return intervals;
    }

    let mut start_idx = if mask[0] { Some(0) } else { None };

    for i in 1..mask.len() {
        if mask[i] && !mask[i - 1] {
            // rising edge: the run is stamped from the last false sample
            start_idx = Some(i - 1);
        } else if !mask[i] && mask[i - 1] {
            let s = start_idx.take().expect("falling edge without a rising edge");
            intervals.push(ContactInterval {
                start_idx: s,
                end_idx: i - 1,
                start: grid.epoch_at(s),
                end: grid.epoch_at(i - 1),
            });
        }
    }

    if let Some(s) = start_idx {
        // run reaches the end of the grid
        let last = mask.len() - 1;
        intervals.push(ContactInterval {
            start_idx: s,
            end_idx: last,
            start: grid.epoch_at(s),
            end: grid.epoch_at(last),
        });
    }

    intervals
}

/// Dual of [true_intervals]: one interval per maximal run of false samples.
pub fn false_intervals(mask: &[bool], grid: &TimeGrid) -> Vec<ContactInterval> {
    let inverted: Vec<bool> = mask.iter().map(|&b| !b).collect();
    true_intervals(&inverted, grid)
}

/// Removes intervals shorter than `min_duration` and forces the excised
/// samples false in `mask`, keeping the interval and mask views consistent.
///
/// For a removed interval `(t_a, t_b)` the entries over `(t_a, t_b]` are
/// cleared; a sample sitting exactly on the rising edge is left untouched.
/// Returns the surviving intervals.
pub fn excise_short_intervals(
    mask: &mut [bool],
    grid: &TimeGrid,
    min_duration: Duration,
) -> Vec<ContactInterval> {
    let intervals = true_intervals(mask, grid);
    let mut kept = Vec::with_capacity(intervals.len());

    for interval in intervals {
        if interval.duration() < min_duration {
            for entry in &mut mask[interval.start_idx + 1..=interval.end_idx] {
                *entry = false;
            }
        } else {
            kept.push(interval);
        }
    }

    kept
}
