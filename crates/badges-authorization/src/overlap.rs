//! Overlap/diff engine over flattened details

use crate::universal::{PermissionDetail, Region};
use tracing::trace;

/// Region shared by two details, with both details attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    /// The shared region
    pub region: Region,
    /// Detail from the first set
    pub first: PermissionDetail,
    /// Detail from the second set
    pub second: PermissionDetail,
}

impl Overlap {
    /// True if both sides carry the same payload.
    pub fn is_unchanged(&self) -> bool {
        self.first.payload == self.second.payload
    }
}

/// Remove `handled` from `value`.
///
/// Returns the parts of `value` outside `handled` (disjoint, carrying
/// `value`'s times and payload) and the overlap, if any.
pub fn remove_overlaps(
    handled: &PermissionDetail,
    value: &PermissionDetail,
) -> (Vec<PermissionDetail>, Option<Overlap>) {
    let (remaining, shared) = value.region.split(&handled.region);
    let remaining = remaining
        .into_iter()
        .map(|region| value.with_region(region))
        .collect();
    let overlap = shared.map(|region| Overlap {
        region,
        first: handled.clone(),
        second: value.clone(),
    });
    (remaining, overlap)
}

/// Carve `region` out of every detail.
pub fn remove_region_from_details(region: &Region, details: &[PermissionDetail]) -> Vec<PermissionDetail> {
    details
        .iter()
        .flat_map(|detail| {
            let (remaining, _) = detail.region.split(region);
            remaining.into_iter().map(|r| detail.with_region(r))
        })
        .collect()
}

fn remove_all(regions: &[PermissionDetail], details: &[PermissionDetail]) -> Vec<PermissionDetail> {
    regions.iter().fold(details.to_vec(), |remaining, handled| {
        remove_region_from_details(&handled.region, &remaining)
    })
}

/// Result of comparing two flattened sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapDiff {
    /// Regions covered by both sets
    pub overlaps: Vec<Overlap>,
    /// Regions covered only by the first set
    pub first_only: Vec<PermissionDetail>,
    /// Regions covered only by the second set
    pub second_only: Vec<PermissionDetail>,
}

/// Split two flattened sets into shared, first-only and second-only regions.
///
/// Both inputs must be non-overlapping within themselves, which holds for
/// flattener output. The three outputs then tile the union of both sets.
pub fn overlaps_and_non_overlaps(first: &[PermissionDetail], second: &[PermissionDetail]) -> OverlapDiff {
    let mut overlaps = Vec::new();
    for a in first {
        for b in second {
            if let (_, Some(overlap)) = remove_overlaps(a, b) {
                overlaps.push(overlap);
            }
        }
    }

    let diff = OverlapDiff {
        overlaps,
        first_only: remove_all(second, first),
        second_only: remove_all(first, second),
    };
    trace!(
        overlaps = diff.overlaps.len(),
        first_only = diff.first_only.len(),
        second_only = diff.second_only.len(),
        "diffed flattened sets"
    );
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;
    use crate::universal::PermissionPayload;
    use badges_core::UintRange;

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn detail(badges: UintRange, value: &str) -> PermissionDetail {
        PermissionDetail {
            region: Region {
                badge_ids: badges,
                ..Region::universal()
            },
            permanently_permitted_times: vec![],
            permanently_forbidden_times: vec![],
            payload: PermissionPayload::Value(FieldValue::Text(value.to_string())),
        }
    }

    #[test]
    fn test_remove_overlaps() {
        let handled = detail(r(5, 8), "x");
        let value = detail(r(1, 10), "y");
        let (remaining, overlap) = remove_overlaps(&handled, &value);

        let badges: Vec<UintRange> = remaining.iter().map(|d| d.region.badge_ids.clone()).collect();
        assert_eq!(badges, vec![r(1, 4), r(9, 10)]);
        assert!(remaining.iter().all(|d| d.payload == value.payload));

        let overlap = overlap.unwrap();
        assert_eq!(overlap.region.badge_ids, r(5, 8));
        assert!(!overlap.is_unchanged());
    }

    #[test]
    fn test_diff_partitions_both_sides() {
        let first = vec![detail(r(1, 10), "a")];
        let second = vec![detail(r(6, 15), "a")];
        let diff = overlaps_and_non_overlaps(&first, &second);

        assert_eq!(diff.overlaps.len(), 1);
        assert_eq!(diff.overlaps[0].region.badge_ids, r(6, 10));
        assert!(diff.overlaps[0].is_unchanged());
        assert_eq!(diff.first_only.len(), 1);
        assert_eq!(diff.first_only[0].region.badge_ids, r(1, 5));
        assert_eq!(diff.second_only.len(), 1);
        assert_eq!(diff.second_only[0].region.badge_ids, r(11, 15));
    }

    #[test]
    fn test_identical_sets_have_no_one_sided_regions() {
        let set = vec![detail(r(1, 3), "a"), detail(r(7, 9), "b")];
        let diff = overlaps_and_non_overlaps(&set, &set);
        assert!(diff.first_only.is_empty());
        assert!(diff.second_only.is_empty());
        assert!(diff.overlaps.iter().all(Overlap::is_unchanged));
    }
}
