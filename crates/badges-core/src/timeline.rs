//! Timeline-valued fields
//!
//! A timeline is a list of items, each holding a value for a set of time
//! windows. Windows of different items never overlap; a time covered by no
//! item is unset.

use crate::errors::{BadgesError, Result};
use crate::ranges::{self, UintRange};
use crate::time::current_unix_timestamp_millis;
use crate::uint::{Uint, MAX_UINT_64};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One value of a timeline together with the windows it is active in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem<V> {
    /// Windows the value is active in
    pub timeline_times: Vec<UintRange>,
    /// The value
    pub value: V,
}

impl<V> TimelineItem<V> {
    /// Item active during `timeline_times`.
    pub fn new(timeline_times: Vec<UintRange>, value: V) -> Self {
        Self {
            timeline_times,
            value,
        }
    }

    /// Item active for all time.
    pub fn always(value: V) -> Self {
        Self::new(vec![UintRange::full()], value)
    }
}

/// Index of the item active at `time` (defaults to now).
pub fn index_at_time<V>(timeline: &[TimelineItem<V>], time: Option<Uint>) -> Option<usize> {
    let time = time.unwrap_or_else(current_unix_timestamp_millis);
    timeline
        .iter()
        .position(|item| ranges::contains_id(&time, &item.timeline_times))
}

/// Item active at `time` (defaults to now).
pub fn value_at_time<V>(timeline: &[TimelineItem<V>], time: Option<Uint>) -> Option<&TimelineItem<V>> {
    index_at_time(timeline, time).map(|idx| &timeline[idx])
}

/// All windows declared by the timeline, normalized.
pub fn declared_times<V>(timeline: &[TimelineItem<V>]) -> Vec<UintRange> {
    let all: Vec<UintRange> = timeline
        .iter()
        .flat_map(|item| item.timeline_times.iter().cloned())
        .collect();
    ranges::sort_and_merge(&all)
}

/// Timeline with its gaps made explicit.
///
/// The complement of every declared window within `[1, max_time]` (default
/// `MAX_UINT_64`) is appended as one item carrying `empty_value`.
pub fn full_timeline<V: Clone>(
    timeline: &[TimelineItem<V>],
    empty_value: V,
    max_time: Option<Uint>,
) -> Vec<TimelineItem<V>> {
    let max_time = max_time.unwrap_or_else(|| MAX_UINT_64.clone());
    let unset = ranges::invert(&declared_times(timeline), Uint::one(), max_time);

    let mut full = timeline.to_vec();
    if !unset.is_empty() {
        trace!(gaps = unset.len(), items = timeline.len(), "filled timeline gaps");
        full.push(TimelineItem::new(unset, empty_value));
    }
    full
}

/// Reject malformed windows and items whose windows overlap.
pub fn validate_timeline<V>(timeline: &[TimelineItem<V>]) -> Result<()> {
    let mut all = Vec::new();
    for item in timeline {
        ranges::validate_ranges(&item.timeline_times)?;
        all.extend_from_slice(&item.timeline_times);
    }
    ranges::validate_no_overlap(&all)
        .map_err(|e| BadgesError::invalid(format!("timeline times overlap: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn sample() -> Vec<TimelineItem<&'static str>> {
        vec![
            TimelineItem::new(vec![r(1, 100)], "A"),
            TimelineItem::new(vec![r(101, 200)], "B"),
        ]
    }

    #[test]
    fn test_value_lookup() {
        let timeline = sample();
        assert_eq!(value_at_time(&timeline, Some(Uint::from(50u64))).unwrap().value, "A");
        assert_eq!(value_at_time(&timeline, Some(Uint::from(150u64))).unwrap().value, "B");
        assert!(value_at_time(&timeline, Some(Uint::from(300u64))).is_none());
        assert_eq!(index_at_time(&timeline, Some(Uint::from(300u64))), None);
        assert_eq!(index_at_time(&timeline, Some(Uint::from(101u64))), Some(1));
    }

    #[test]
    fn test_default_time_is_now() {
        let timeline = vec![TimelineItem::always("forever")];
        assert_eq!(value_at_time(&timeline, None).unwrap().value, "forever");
        assert!(value_at_time(&sample(), None).is_none());
    }

    #[test]
    fn test_full_timeline_fills_gaps() {
        let full = full_timeline(&sample(), "", None);
        assert_eq!(full.len(), 3);
        assert_eq!(full[2].timeline_times, vec![UintRange::new(Uint::from(201u64), MAX_UINT_64.clone()).unwrap()]);
        assert_eq!(full[2].value, "");

        let bounded = full_timeline(&sample(), "", Some(Uint::from(200u64)));
        assert_eq!(bounded.len(), 2);

        let from_empty = full_timeline::<&str>(&[], "unset", None);
        assert_eq!(from_empty, vec![TimelineItem::always("unset")]);
    }

    #[test]
    fn test_validate_timeline() {
        assert!(validate_timeline(&sample()).is_ok());
        let overlapping = vec![
            TimelineItem::new(vec![r(1, 100)], "A"),
            TimelineItem::new(vec![r(100, 200)], "B"),
        ];
        assert!(validate_timeline(&overlapping).is_err());
        let inverted = vec![TimelineItem::new(
            vec![UintRange { start: Uint::from(9u64), end: Uint::from(1u64) }],
            "A",
        )];
        assert!(validate_timeline(&inverted).is_err());
    }
}
