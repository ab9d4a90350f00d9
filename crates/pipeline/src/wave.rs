//! Partitioning of the job list into capacity-bounded waves.

use std::ops::Range;

/// Consecutive index ranges of at most `capacity` jobs covering `0..total`.
///
/// A `capacity` of zero is treated as one. Only the last range may be
/// shorter than `capacity`.
pub fn wave_ranges(total: usize, capacity: usize) -> Vec<Range<usize>> {
    let capacity = capacity.max(1);
    (0..total)
        .step_by(capacity)
        .map(|start| start..(start + capacity).min(total))
        .collect()
}
