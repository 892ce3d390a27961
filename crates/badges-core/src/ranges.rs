//! Interval algebra over inclusive `UintRange`s
//!
//! Every operation is pure. Functions that return range lists return them
//! normalized: sorted by start, merged where they overlap or touch.

use crate::errors::{BadgesError, Result};
use crate::uint::{Uint, MAX_UINT_64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive interval `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UintRange {
    /// First value in the range
    pub start: Uint,
    /// Last value in the range
    pub end: Uint,
}

impl UintRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: impl Into<Uint>, end: impl Into<Uint>) -> Result<Self> {
        let range = Self {
            start: start.into(),
            end: end.into(),
        };
        if range.start > range.end {
            return Err(BadgesError::invalid(format!(
                "range start {} is greater than end {}",
                range.start, range.end
            )));
        }
        Ok(range)
    }

    /// The whole domain `[1, MAX_UINT_64]`.
    pub fn full() -> Self {
        Self {
            start: Uint::one(),
            end: MAX_UINT_64.clone(),
        }
    }

    /// `[id, id]`
    pub fn single(id: impl Into<Uint>) -> Self {
        let id = id.into();
        Self {
            start: id.clone(),
            end: id,
        }
    }

    /// True if `id` lies in the range.
    pub fn contains(&self, id: &Uint) -> bool {
        &self.start <= id && id <= &self.end
    }

    /// True if the ranges share at least one value.
    pub fn overlaps(&self, other: &UintRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Shared part of two ranges.
    pub fn intersect(&self, other: &UintRange) -> Option<UintRange> {
        self.overlaps(other).then(|| UintRange {
            start: std::cmp::max(&self.start, &other.start).clone(),
            end: std::cmp::min(&self.end, &other.end).clone(),
        })
    }

    /// Subtract `to_remove` from this range.
    ///
    /// Returns the (at most two) leftover pieces and the removed part.
    pub fn remove(&self, to_remove: &UintRange) -> (Vec<UintRange>, Option<UintRange>) {
        let Some(removed) = self.intersect(to_remove) else {
            return (vec![self.clone()], None);
        };

        let mut remaining = Vec::with_capacity(2);
        if removed.start > self.start {
            if let Some(end) = removed.start.predecessor() {
                remaining.push(UintRange {
                    start: self.start.clone(),
                    end,
                });
            }
        }
        if removed.end < self.end {
            remaining.push(UintRange {
                start: removed.end.successor(),
                end: self.end.clone(),
            });
        }
        (remaining, Some(removed))
    }

    /// Check `start <= end` and that both ends lie in `[1, MAX_UINT_64]`.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(BadgesError::invalid(format!(
                "range start {} is greater than end {}",
                self.start, self.end
            )));
        }
        if self.start.is_zero() {
            return Err(BadgesError::invalid(format!("range {self} starts at zero")));
        }
        if self.end > *MAX_UINT_64 {
            return Err(BadgesError::invalid(format!(
                "range {self} exceeds the maximum {}",
                *MAX_UINT_64
            )));
        }
        Ok(())
    }
}

impl fmt::Display for UintRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else if self.end == *MAX_UINT_64 {
            write!(f, "{}-max", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Render a range list as `[1-10, 12]`.
pub fn fmt_ranges(ranges: &[UintRange]) -> String {
    let parts: Vec<String> = ranges.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Sort by start (then end) without merging.
pub fn sort_ranges(ranges: &[UintRange]) -> Vec<UintRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    sorted
}

/// Sort and merge overlapping or adjacent ranges.
pub fn sort_and_merge(ranges: &[UintRange]) -> Vec<UintRange> {
    let mut merged: Vec<UintRange> = Vec::with_capacity(ranges.len());
    for range in sort_ranges(ranges) {
        match merged.last_mut() {
            Some(last) if range.start <= last.end.successor() => {
                if range.end > last.end {
                    last.end = range.end;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Alias of [`sort_and_merge`].
pub fn normalize(ranges: &[UintRange]) -> Vec<UintRange> {
    sort_and_merge(ranges)
}

/// Binary search for `id`.
///
/// The search runs over the normalized form of `ranges`; the returned index
/// refers to that form. On a miss the index is the insertion point.
pub fn search(id: &Uint, ranges: &[UintRange]) -> (usize, bool) {
    let normalized = sort_and_merge(ranges);
    let mut left = 0usize;
    let mut right = normalized.len();
    while left < right {
        let mid = left + (right - left) / 2;
        let range = &normalized[mid];
        if range.contains(id) {
            return (mid, true);
        }
        if id < &range.start {
            right = mid;
        } else {
            left = mid + 1;
        }
    }
    (left, false)
}

/// True if any range contains `id`; input need not be normalized.
pub fn contains_id(id: &Uint, ranges: &[UintRange]) -> bool {
    ranges.iter().any(|range| range.contains(id))
}

/// Set subtraction `from \ to_remove`.
///
/// Returns `(remaining, removed)`, both normalized.
pub fn remove_ranges(
    to_remove: &[UintRange],
    from: &[UintRange],
) -> (Vec<UintRange>, Vec<UintRange>) {
    let mut remaining = from.to_vec();
    let mut removed = Vec::new();
    for handled in to_remove {
        let mut next = Vec::with_capacity(remaining.len());
        for range in &remaining {
            let (rest, overlap) = range.remove(handled);
            next.extend(rest);
            removed.extend(overlap);
        }
        remaining = next;
    }
    (sort_and_merge(&remaining), sort_and_merge(&removed))
}

/// Complement of `ranges` within `[min, max]`.
pub fn invert(ranges: &[UintRange], min: Uint, max: Uint) -> Vec<UintRange> {
    if min > max {
        return Vec::new();
    }
    remove_ranges(ranges, &[UintRange { start: min, end: max }]).0
}

/// Complement of `ranges` within `[1, MAX_UINT_64]`.
pub fn invert_full(ranges: &[UintRange]) -> Vec<UintRange> {
    invert(ranges, Uint::one(), MAX_UINT_64.clone())
}

/// Union of two lists.
pub fn union(first: &[UintRange], second: &[UintRange]) -> Vec<UintRange> {
    let mut all = first.to_vec();
    all.extend_from_slice(second);
    sort_and_merge(&all)
}

/// Intersection of two lists.
pub fn intersection(first: &[UintRange], second: &[UintRange]) -> Vec<UintRange> {
    remove_ranges(second, first).1
}

/// True if every value of `subset` lies in `superset`.
pub fn is_subset(subset: &[UintRange], superset: &[UintRange]) -> bool {
    remove_ranges(superset, subset).0.is_empty()
}

/// Result of comparing two range lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDiff {
    /// Values only in the first list
    pub first_only: Vec<UintRange>,
    /// Values only in the second list
    pub second_only: Vec<UintRange>,
    /// Values in both lists
    pub overlaps: Vec<UintRange>,
}

/// Split two lists into first-only, second-only and shared values.
pub fn overlaps_and_non_overlaps(first: &[UintRange], second: &[UintRange]) -> RangeDiff {
    let (first_only, overlaps) = remove_ranges(second, first);
    let (second_only, _) = remove_ranges(first, second);
    RangeDiff {
        first_only,
        second_only,
        overlaps,
    }
}

/// Validate each range (see [`UintRange::validate`]).
pub fn validate_ranges(ranges: &[UintRange]) -> Result<()> {
    ranges.iter().try_for_each(UintRange::validate)
}

/// Validate each range and reject any two that overlap.
pub fn validate_no_overlap(ranges: &[UintRange]) -> Result<()> {
    validate_ranges(ranges)?;
    let sorted = sort_ranges(ranges);
    for pair in sorted.windows(2) {
        if pair[0].overlaps(&pair[1]) {
            return Err(BadgesError::invalid(format!(
                "ranges {} and {} overlap",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}
