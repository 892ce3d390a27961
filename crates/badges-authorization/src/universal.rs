//! Universal permissions and their atomic decomposition
//!
//! Every approval, permission and timeline value is converted into a
//! [`UniversalPermission`]: a declaration over ten independent dimensions plus
//! permitted/forbidden time windows and a payload. Flattening breaks
//! declarations into [`PermissionDetail`]s, each holding exactly one range or
//! list per dimension (a [`Region`]).

use crate::approvals::{ApprovalValue, CriteriaStack};
use crate::fields::FieldValue;
use badges_core::address_list::{remove_address_list, AddressList, ALL_WITH_MINT};
use badges_core::ranges::{self, fmt_ranges};
use badges_core::{Uint, UintRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One dimension of a region.
pub trait Axis: Clone {
    /// Split `self` by `handled` into leftovers and the shared part.
    fn split_axis(&self, handled: &Self) -> (Vec<Self>, Option<Self>);
}

impl Axis for UintRange {
    fn split_axis(&self, handled: &Self) -> (Vec<Self>, Option<Self>) {
        self.remove(handled)
    }
}

impl Axis for AddressList {
    fn split_axis(&self, handled: &Self) -> (Vec<Self>, Option<Self>) {
        let (remaining, removed) = remove_address_list(handled, self);
        let remaining = if remaining.is_empty() {
            Vec::new()
        } else {
            vec![remaining]
        };
        // Keep the named list when nothing was carved off it.
        let removed = if same_members(&removed, self) {
            self.clone()
        } else {
            removed
        };
        (remaining, (!removed.is_empty()).then_some(removed))
    }
}

fn same_members(first: &AddressList, second: &AddressList) -> bool {
    let members = |list: &AddressList| list.addresses.iter().cloned().collect::<BTreeSet<_>>();
    first.whitelist == second.whitelist && members(first) == members(second)
}

/// A box in permission space: one value per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub badge_ids: UintRange,
    pub timeline_times: UintRange,
    pub transfer_times: UintRange,
    pub ownership_times: UintRange,
    pub to_list: AddressList,
    pub from_list: AddressList,
    pub initiated_by_list: AddressList,
    pub approval_id_list: AddressList,
    pub amount_tracker_id_list: AddressList,
    pub challenge_tracker_id_list: AddressList,
}

// Peels one axis at a time: axes already visited take the overlap, the current
// axis takes each leftover, later axes keep the original value. The pieces are
// pairwise disjoint and, with the overlap, cover the original region exactly.
macro_rules! split_axes {
    ($value:expr, $handled:expr, [$($axis:ident),+ $(,)?]) => {{
        $( let $axis = $value.$axis.split_axis(&$handled.$axis); )+

        let overlap = Region {
            $( $axis: match &$axis.1 {
                Some(shared) => shared.clone(),
                None => return (vec![$value.clone()], None),
            }, )+
        };

        let mut remaining = Vec::new();
        let mut base = $value.clone();
        $(
            for leftover in $axis.0 {
                let mut piece = base.clone();
                piece.$axis = leftover;
                remaining.push(piece);
            }
            base.$axis = overlap.$axis.clone();
        )+
        (remaining, Some(overlap))
    }};
}

impl Region {
    /// Region spanning the whole space.
    pub fn universal() -> Self {
        Self {
            badge_ids: UintRange::full(),
            timeline_times: UintRange::full(),
            transfer_times: UintRange::full(),
            ownership_times: UintRange::full(),
            to_list: ALL_WITH_MINT.clone(),
            from_list: ALL_WITH_MINT.clone(),
            initiated_by_list: ALL_WITH_MINT.clone(),
            approval_id_list: ALL_WITH_MINT.clone(),
            amount_tracker_id_list: ALL_WITH_MINT.clone(),
            challenge_tracker_id_list: ALL_WITH_MINT.clone(),
        }
    }

    /// Split `self` by `handled`.
    ///
    /// Returns the parts of `self` outside `handled` and the part inside it.
    pub fn split(&self, handled: &Region) -> (Vec<Region>, Option<Region>) {
        split_axes!(
            self,
            handled,
            [
                badge_ids,
                timeline_times,
                transfer_times,
                ownership_times,
                to_list,
                from_list,
                initiated_by_list,
                approval_id_list,
                amount_tracker_id_list,
                challenge_tracker_id_list,
            ]
        )
    }

    /// True if the regions share a point.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.split(other).1.is_some()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (name, range) in [
            ("badgeIds", &self.badge_ids),
            ("timelineTimes", &self.timeline_times),
            ("transferTimes", &self.transfer_times),
            ("ownershipTimes", &self.ownership_times),
        ] {
            if *range != UintRange::full() {
                parts.push(format!("{name} {}", fmt_ranges(std::slice::from_ref(range))));
            }
        }
        for (name, list) in [
            ("toList", &self.to_list),
            ("fromList", &self.from_list),
            ("initiatedByList", &self.initiated_by_list),
            ("approvalId", &self.approval_id_list),
            ("amountTrackerId", &self.amount_tracker_id_list),
            ("challengeTrackerId", &self.challenge_tracker_id_list),
        ] {
            if !list.is_universal() {
                parts.push(format!("{name} {}", list.describe()));
            }
        }
        if parts.is_empty() {
            f.write_str("all values")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Payload carried through flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PermissionPayload {
    /// Permissions carry only their time windows
    Empty,
    /// Timeline value
    Value(FieldValue),
    /// Approval contents compared across updates
    Approval(Box<ApprovalValue>),
    /// Criteria that accumulate where approvals overlap
    Criteria(CriteriaStack),
}

impl PermissionPayload {
    /// Payload of a region claimed by an earlier declaration and overlapped by
    /// a later one. `None` means the earlier payload stands.
    pub fn merge_overlap(&self, later: &PermissionPayload) -> Option<PermissionPayload> {
        match (self, later) {
            (Self::Criteria(earlier), Self::Criteria(later)) => {
                Some(Self::Criteria(earlier.stacked(later)))
            }
            _ => None,
        }
    }
}

/// Atomic, non-overlapping unit produced by flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDetail {
    pub region: Region,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
    pub payload: PermissionPayload,
}

impl PermissionDetail {
    /// Same times and payload over another region.
    pub fn with_region(&self, region: Region) -> Self {
        Self {
            region,
            permanently_permitted_times: self.permanently_permitted_times.clone(),
            permanently_forbidden_times: self.permanently_forbidden_times.clone(),
            payload: self.payload.clone(),
        }
    }

    /// True if `now` falls in a permitted window.
    pub fn is_permitted_at(&self, now: &Uint) -> bool {
        ranges::contains_id(now, &self.permanently_permitted_times)
    }

    /// True if `now` falls in a forbidden window.
    pub fn is_forbidden_at(&self, now: &Uint) -> bool {
        ranges::contains_id(now, &self.permanently_forbidden_times)
    }
}

/// Declaration over every dimension.
///
/// Dimensions left at their default span the whole space, which is how a
/// declaration says it does not use that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalPermission {
    pub badge_ids: Vec<UintRange>,
    pub timeline_times: Vec<UintRange>,
    pub transfer_times: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub to_list: AddressList,
    pub from_list: AddressList,
    pub initiated_by_list: AddressList,
    pub approval_id_list: AddressList,
    pub amount_tracker_id_list: AddressList,
    pub challenge_tracker_id_list: AddressList,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
    pub payload: PermissionPayload,
}

impl UniversalPermission {
    /// Declaration over the whole space with no time windows.
    pub fn new(payload: PermissionPayload) -> Self {
        let universal = Region::universal();
        Self {
            badge_ids: vec![universal.badge_ids],
            timeline_times: vec![universal.timeline_times],
            transfer_times: vec![universal.transfer_times],
            ownership_times: vec![universal.ownership_times],
            to_list: universal.to_list,
            from_list: universal.from_list,
            initiated_by_list: universal.initiated_by_list,
            approval_id_list: universal.approval_id_list,
            amount_tracker_id_list: universal.amount_tracker_id_list,
            challenge_tracker_id_list: universal.challenge_tracker_id_list,
            permanently_permitted_times: Vec::new(),
            permanently_forbidden_times: Vec::new(),
            payload,
        }
    }

    pub fn with_badge_ids(mut self, badge_ids: Vec<UintRange>) -> Self {
        self.badge_ids = badge_ids;
        self
    }

    pub fn with_timeline_times(mut self, timeline_times: Vec<UintRange>) -> Self {
        self.timeline_times = timeline_times;
        self
    }

    pub fn with_transfer_times(mut self, transfer_times: Vec<UintRange>) -> Self {
        self.transfer_times = transfer_times;
        self
    }

    pub fn with_ownership_times(mut self, ownership_times: Vec<UintRange>) -> Self {
        self.ownership_times = ownership_times;
        self
    }

    /// Set the to, from and initiated-by lists.
    pub fn with_transfer_lists(
        mut self,
        to_list: AddressList,
        from_list: AddressList,
        initiated_by_list: AddressList,
    ) -> Self {
        self.to_list = to_list;
        self.from_list = from_list;
        self.initiated_by_list = initiated_by_list;
        self
    }

    /// Set the approval, amount-tracker and challenge-tracker id lists.
    pub fn with_id_lists(
        mut self,
        approval_id_list: AddressList,
        amount_tracker_id_list: AddressList,
        challenge_tracker_id_list: AddressList,
    ) -> Self {
        self.approval_id_list = approval_id_list;
        self.amount_tracker_id_list = amount_tracker_id_list;
        self.challenge_tracker_id_list = challenge_tracker_id_list;
        self
    }

    /// Set the permitted and forbidden windows.
    pub fn with_times(mut self, permitted: Vec<UintRange>, forbidden: Vec<UintRange>) -> Self {
        self.permanently_permitted_times = permitted;
        self.permanently_forbidden_times = forbidden;
        self
    }

    /// One detail per badge × timeline × transfer × ownership combination.
    ///
    /// Lists are not enumerated. Overlap between the details of one
    /// declaration is left for the flattener to resolve.
    pub fn details(&self) -> Vec<PermissionDetail> {
        let mut details = Vec::new();
        for badge_ids in &self.badge_ids {
            for timeline_times in &self.timeline_times {
                for transfer_times in &self.transfer_times {
                    for ownership_times in &self.ownership_times {
                        details.push(PermissionDetail {
                            region: Region {
                                badge_ids: badge_ids.clone(),
                                timeline_times: timeline_times.clone(),
                                transfer_times: transfer_times.clone(),
                                ownership_times: ownership_times.clone(),
                                to_list: self.to_list.clone(),
                                from_list: self.from_list.clone(),
                                initiated_by_list: self.initiated_by_list.clone(),
                                approval_id_list: self.approval_id_list.clone(),
                                amount_tracker_id_list: self.amount_tracker_id_list.clone(),
                                challenge_tracker_id_list: self.challenge_tracker_id_list.clone(),
                            },
                            permanently_permitted_times: self.permanently_permitted_times.clone(),
                            permanently_forbidden_times: self.permanently_forbidden_times.clone(),
                            payload: self.payload.clone(),
                        });
                    }
                }
            }
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn region(badges: UintRange, times: UintRange) -> Region {
        Region {
            badge_ids: badges,
            timeline_times: times,
            ..Region::universal()
        }
    }

    #[test]
    fn test_split_disjoint_regions() {
        let value = region(r(1, 10), r(1, 10));
        let handled = region(r(11, 20), r(1, 10));
        let (rest, overlap) = value.split(&handled);
        assert_eq!(rest, vec![value]);
        assert!(overlap.is_none());
    }

    #[test]
    fn test_split_peels_axes_in_order() {
        let value = region(r(1, 10), r(1, 10));
        let handled = region(r(5, 20), r(5, 20));
        let (rest, overlap) = value.split(&handled);

        assert_eq!(overlap, Some(region(r(5, 10), r(5, 10))));
        assert_eq!(
            rest,
            vec![region(r(1, 4), r(1, 10)), region(r(5, 10), r(1, 4))]
        );
    }

    #[test]
    fn test_split_on_lists() {
        let value = Region {
            to_list: AddressList::whitelist(["a1", "b2"]),
            ..Region::universal()
        };
        let handled = Region {
            to_list: AddressList::whitelist(["b2"]),
            ..Region::universal()
        };
        let (rest, overlap) = value.split(&handled);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].to_list.addresses, vec!["a1"]);
        assert_eq!(overlap.unwrap().to_list.addresses, vec!["b2"]);
    }

    #[test]
    fn test_details_enumerate_range_combinations() {
        let permission = UniversalPermission::new(PermissionPayload::Empty)
            .with_badge_ids(vec![r(1, 5), r(8, 9)])
            .with_timeline_times(vec![r(1, 2), r(3, 4), r(5, 6)]);
        assert_eq!(permission.details().len(), 6);

        let unused = UniversalPermission::new(PermissionPayload::Empty).with_badge_ids(vec![]);
        assert!(unused.details().is_empty());
    }

    #[test]
    fn test_merge_overlap_only_stacks_criteria() {
        let text = PermissionPayload::Value(FieldValue::Text("a".into()));
        assert!(text.merge_overlap(&text).is_none());

        let stack = PermissionPayload::Criteria(CriteriaStack::default());
        assert!(matches!(
            stack.merge_overlap(&stack),
            Some(PermissionPayload::Criteria(_))
        ));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(Region::universal().to_string(), "all values");
        let shown = region(r(5, 10), UintRange::full()).to_string();
        assert_eq!(shown, "badgeIds [5-10]");
    }
}
