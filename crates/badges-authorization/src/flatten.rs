//! First-match-only flattening
//!
//! Declarations are processed in order. Each part of the space belongs to the
//! first declaration that covers it; later declarations only claim what is
//! still unclaimed. Approval criteria are the exception: where two criteria
//! payloads overlap they stack instead of shadowing each other.

use crate::overlap::remove_region_from_details;
use crate::universal::{PermissionDetail, UniversalPermission};
use tracing::{debug, trace};

/// Flatten declarations into non-overlapping details, first match winning.
///
/// The output tiles exactly the union of the declared regions and is sorted
/// (stably) by badge-id start.
pub fn first_match_only(permissions: &[UniversalPermission]) -> Vec<PermissionDetail> {
    let mut handled: Vec<PermissionDetail> = Vec::new();

    for (idx, permission) in permissions.iter().enumerate() {
        for candidate in permission.details() {
            let mut unclaimed = vec![candidate.clone()];
            let mut next = Vec::with_capacity(handled.len() + 1);

            for existing in handled {
                unclaimed = remove_region_from_details(&existing.region, &unclaimed);

                match existing.payload.merge_overlap(&candidate.payload) {
                    Some(merged) => {
                        let (rest, shared) = existing.region.split(&candidate.region);
                        match shared {
                            Some(region) => {
                                next.extend(rest.into_iter().map(|r| existing.with_region(r)));
                                let mut stacked = existing.with_region(region);
                                stacked.payload = merged;
                                next.push(stacked);
                            }
                            None => next.push(existing),
                        }
                    }
                    None => next.push(existing),
                }
            }

            trace!(
                declaration = idx,
                claimed = unclaimed.len(),
                "flattened candidate"
            );
            next.extend(unclaimed);
            handled = next;
        }
    }

    handled.sort_by(|a, b| a.region.badge_ids.start.cmp(&b.region.badge_ids.start));
    debug!(
        declarations = permissions.len(),
        details = handled.len(),
        "flattened declarations"
    );
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approvals::{ApprovalCriteria, CriteriaStack};
    use crate::fields::FieldValue;
    use crate::universal::PermissionPayload;
    use badges_core::{Uint, UintRange};

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn text(value: &str) -> PermissionPayload {
        PermissionPayload::Value(FieldValue::Text(value.to_string()))
    }

    fn over(badges: Vec<UintRange>, payload: PermissionPayload) -> UniversalPermission {
        UniversalPermission::new(payload).with_badge_ids(badges)
    }

    fn payload_at(details: &[PermissionDetail], id: u64) -> Option<&PermissionPayload> {
        details
            .iter()
            .find(|d| d.region.badge_ids.contains(&Uint::from(id)))
            .map(|d| &d.payload)
    }

    #[test]
    fn test_first_declaration_wins() {
        let details = first_match_only(&[
            over(vec![r(1, 10)], text("first")),
            over(vec![r(5, 20)], text("second")),
        ]);

        assert_eq!(payload_at(&details, 7), Some(&text("first")));
        assert_eq!(payload_at(&details, 15), Some(&text("second")));
        assert_eq!(payload_at(&details, 21), None);

        let badges: Vec<UintRange> = details.iter().map(|d| d.region.badge_ids.clone()).collect();
        assert_eq!(badges, vec![r(1, 10), r(11, 20)]);
    }

    #[test]
    fn test_output_sorted_by_badge_start() {
        let details = first_match_only(&[
            over(vec![r(50, 60)], text("a")),
            over(vec![r(1, 5)], text("b")),
        ]);
        assert_eq!(details[0].region.badge_ids, r(1, 5));
        assert_eq!(details[1].region.badge_ids, r(50, 60));
    }

    #[test]
    fn test_criteria_stack_on_overlap() {
        let approve = PermissionPayload::Criteria(CriteriaStack::single(ApprovalCriteria::default()));
        let reject = PermissionPayload::Criteria(CriteriaStack::single(ApprovalCriteria {
            require_to_equals_initiated_by: true,
            require_to_does_not_equal_initiated_by: true,
            ..ApprovalCriteria::default()
        }));
        let details = first_match_only(&[over(vec![r(1, 10)], approve), over(vec![r(6, 15)], reject)]);

        let Some(PermissionPayload::Criteria(low)) = payload_at(&details, 3) else {
            panic!("expected criteria");
        };
        assert_eq!(low.criteria.len(), 1);
        assert!(low.is_approved);

        let Some(PermissionPayload::Criteria(shared)) = payload_at(&details, 8) else {
            panic!("expected criteria");
        };
        assert_eq!(shared.criteria.len(), 2);
        assert!(!shared.is_approved);

        let Some(PermissionPayload::Criteria(high)) = payload_at(&details, 12) else {
            panic!("expected criteria");
        };
        assert_eq!(high.criteria.len(), 1);
        assert!(!high.is_approved);
    }

    #[test]
    fn test_overlap_within_one_declaration() {
        let details = first_match_only(&[over(vec![r(1, 10), r(5, 12)], text("a"))]);
        let badges: Vec<UintRange> = details.iter().map(|d| d.region.badge_ids.clone()).collect();
        assert_eq!(badges, vec![r(1, 10), r(11, 12)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(first_match_only(&[]).is_empty());
    }
}
