//! Transfer approvals
//!
//! Collection approvals are declared with address list ids. Before anything
//! can be compared they are expanded: ids resolved to lists, ranges validated
//! and normalized. User-level approvals become collection approvals by pinning
//! the owner as sender (outgoing) or recipient (incoming).

mod criteria;

pub use criteria::{
    ApprovalAmounts, ApprovalCriteria, Balance, Coin, CoinTransfer, CriteriaStack,
    IncrementedBalances, ManualBalances, MaxNumTransfers, MerkleChallenge, MustOwnBadges,
    PredeterminedBalances, PredeterminedOrderCalculationMethod, ZkProof,
};

use crate::flatten::first_match_only;
use crate::universal::{PermissionDetail, PermissionPayload, UniversalPermission};
use badges_core::address_list::{AddressList, AddressListResolver, ALL_LIST_ID, ALL_WITH_MINT};
use badges_core::ranges::{self, UintRange};
use badges_core::{BadgesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Collection-level transfer approval.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionApproval {
    pub from_list_id: String,
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    /// Unique within the collection
    pub approval_id: String,
    /// Tracker tallying amounts; empty means untracked
    pub amount_tracker_id: String,
    /// Tracker recording used challenge leaves; empty means untracked
    pub challenge_tracker_id: String,
    pub uri: String,
    pub custom_data: String,
    pub approval_criteria: Option<ApprovalCriteria>,
}

/// Approval a user grants for badges leaving their balance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOutgoingApproval {
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub uri: String,
    pub custom_data: String,
    pub approval_criteria: Option<ApprovalCriteria>,
}

impl UserOutgoingApproval {
    /// Same approval with `user` as the only sender.
    pub fn into_collection_approval(self, user: &str) -> CollectionApproval {
        CollectionApproval {
            from_list_id: user.to_string(),
            to_list_id: self.to_list_id,
            initiated_by_list_id: self.initiated_by_list_id,
            transfer_times: self.transfer_times,
            badge_ids: self.badge_ids,
            ownership_times: self.ownership_times,
            approval_id: self.approval_id,
            amount_tracker_id: self.amount_tracker_id,
            challenge_tracker_id: self.challenge_tracker_id,
            uri: self.uri,
            custom_data: self.custom_data,
            approval_criteria: self.approval_criteria,
        }
    }
}

/// Approval a user grants for badges arriving in their balance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserIncomingApproval {
    pub from_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub uri: String,
    pub custom_data: String,
    pub approval_criteria: Option<ApprovalCriteria>,
}

impl UserIncomingApproval {
    /// Same approval with `user` as the only recipient.
    pub fn into_collection_approval(self, user: &str) -> CollectionApproval {
        CollectionApproval {
            from_list_id: self.from_list_id,
            to_list_id: user.to_string(),
            initiated_by_list_id: self.initiated_by_list_id,
            transfer_times: self.transfer_times,
            badge_ids: self.badge_ids,
            ownership_times: self.ownership_times,
            approval_id: self.approval_id,
            amount_tracker_id: self.amount_tracker_id,
            challenge_tracker_id: self.challenge_tracker_id,
            uri: self.uri,
            custom_data: self.custom_data,
            approval_criteria: self.approval_criteria,
        }
    }
}

/// What an approval region carries when approvals are compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalValue {
    pub approval_id: String,
    pub uri: String,
    pub custom_data: String,
    pub approval_criteria: ApprovalCriteria,
}

/// Approval with its lists resolved and its ranges normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedApproval {
    pub from_list: AddressList,
    pub to_list: AddressList,
    pub initiated_by_list: AddressList,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub uri: String,
    pub custom_data: String,
    pub approval_criteria: ApprovalCriteria,
}

impl ExpandedApproval {
    fn base(&self, payload: PermissionPayload) -> UniversalPermission {
        UniversalPermission::new(payload)
            .with_badge_ids(self.badge_ids.clone())
            .with_transfer_times(self.transfer_times.clone())
            .with_ownership_times(self.ownership_times.clone())
            .with_transfer_lists(
                self.to_list.clone(),
                self.from_list.clone(),
                self.initiated_by_list.clone(),
            )
    }

    /// Declaration keyed by approval and tracker ids, carrying the approval.
    pub fn to_universal(&self) -> UniversalPermission {
        let value = ApprovalValue {
            approval_id: self.approval_id.clone(),
            uri: self.uri.clone(),
            custom_data: self.custom_data.clone(),
            approval_criteria: self.approval_criteria.clone(),
        };
        self.base(PermissionPayload::Approval(Box::new(value))).with_id_lists(
            AddressList::whitelist([self.approval_id.as_str()]),
            id_list(&self.amount_tracker_id),
            id_list(&self.challenge_tracker_id),
        )
    }

    /// Declaration over transfers only, carrying the criteria as a stack.
    pub fn to_criteria_universal(&self) -> UniversalPermission {
        self.base(PermissionPayload::Criteria(CriteriaStack::single(
            self.approval_criteria.clone(),
        )))
    }
}

/// Single-id list; empty and `All` match every id.
pub fn id_list(id: &str) -> AddressList {
    if id.is_empty() || id == ALL_LIST_ID {
        ALL_WITH_MINT.clone()
    } else {
        AddressList::whitelist([id])
    }
}

/// Resolve and validate approvals.
///
/// Approval ids must be unique, non-empty and not the reserved `All`.
pub fn expand_collection_approvals<R: AddressListResolver>(
    approvals: &[CollectionApproval],
    resolver: &R,
) -> Result<Vec<ExpandedApproval>> {
    let mut seen = BTreeSet::new();
    approvals
        .iter()
        .map(|approval| {
            let id = approval.approval_id.as_str();
            if id.is_empty() || id == ALL_LIST_ID {
                return Err(BadgesError::invalid(format!("approval id {id:?} is not allowed")));
            }
            if !seen.insert(id) {
                return Err(BadgesError::invalid(format!("duplicate approval id {id:?}")));
            }
            expand_one(approval, resolver)
        })
        .collect()
}

fn expand_one<R: AddressListResolver>(approval: &CollectionApproval, resolver: &R) -> Result<ExpandedApproval> {
    let normalized = |list: &[UintRange]| -> Result<Vec<UintRange>> {
        ranges::validate_ranges(list)?;
        Ok(ranges::sort_and_merge(list))
    };

    Ok(ExpandedApproval {
        from_list: resolver.resolve(&approval.from_list_id)?,
        to_list: resolver.resolve(&approval.to_list_id)?,
        initiated_by_list: resolver.resolve(&approval.initiated_by_list_id)?,
        transfer_times: normalized(&approval.transfer_times)?,
        badge_ids: normalized(&approval.badge_ids)?,
        ownership_times: normalized(&approval.ownership_times)?,
        approval_id: approval.approval_id.clone(),
        amount_tracker_id: approval.amount_tracker_id.clone(),
        challenge_tracker_id: approval.challenge_tracker_id.clone(),
        uri: approval.uri.clone(),
        custom_data: approval.custom_data.clone(),
        approval_criteria: approval.approval_criteria.clone().unwrap_or_default(),
    })
}

/// Criteria applying to every atomic transfer region, in declaration order.
///
/// Where approvals overlap their criteria stack and the region is approved
/// only if every overlapping approval approves.
pub fn approval_criteria_stacks(approvals: &[ExpandedApproval]) -> Vec<PermissionDetail> {
    let declarations: Vec<UniversalPermission> = approvals
        .iter()
        .map(ExpandedApproval::to_criteria_universal)
        .collect();
    first_match_only(&declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use badges_core::{ReservedLists, Uint};

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn approval(id: &str, badges: Vec<UintRange>) -> CollectionApproval {
        CollectionApproval {
            from_list_id: "Mint".into(),
            to_list_id: "All".into(),
            initiated_by_list_id: "All".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: badges,
            ownership_times: vec![UintRange::full()],
            approval_id: id.into(),
            ..CollectionApproval::default()
        }
    }

    #[test]
    fn test_expand_normalizes_and_resolves() {
        let expanded =
            expand_collection_approvals(&[approval("mint", vec![r(5, 10), r(1, 4)])], &ReservedLists)
                .unwrap();
        assert_eq!(expanded[0].badge_ids, vec![r(1, 10)]);
        assert!(expanded[0].from_list.contains("Mint"));
        assert!(expanded[0].to_list.is_universal());
        assert_eq!(expanded[0].approval_criteria, ApprovalCriteria::default());
    }

    #[test]
    fn test_expand_rejects_bad_ids() {
        let duplicate = [approval("a", vec![r(1, 1)]), approval("a", vec![r(2, 2)])];
        assert!(expand_collection_approvals(&duplicate, &ReservedLists).is_err());
        assert!(expand_collection_approvals(&[approval("", vec![])], &ReservedLists).is_err());
        assert!(expand_collection_approvals(&[approval("All", vec![])], &ReservedLists).is_err());

        let mut unknown = approval("x", vec![]);
        unknown.to_list_id = "friends".into();
        assert!(matches!(
            expand_collection_approvals(&[unknown], &ReservedLists),
            Err(BadgesError::NotFound { .. })
        ));

        let zero = approval("z", vec![UintRange {
            start: Uint::zero(),
            end: Uint::one(),
        }]);
        assert!(matches!(
            expand_collection_approvals(&[zero], &ReservedLists),
            Err(BadgesError::Invalid { .. })
        ));
    }

    #[test]
    fn test_user_approvals_pin_owner() {
        let owner = "0x1111111111111111111111111111111111111111";
        let outgoing = UserOutgoingApproval {
            to_list_id: "All".into(),
            approval_id: "out".into(),
            ..UserOutgoingApproval::default()
        }
        .into_collection_approval(owner);
        assert_eq!(outgoing.from_list_id, owner);

        let incoming = UserIncomingApproval {
            from_list_id: "All".into(),
            approval_id: "in".into(),
            ..UserIncomingApproval::default()
        }
        .into_collection_approval(owner);
        assert_eq!(incoming.to_list_id, owner);
        assert!(ReservedLists.resolve(&incoming.to_list_id).unwrap().contains(owner));
    }

    #[test]
    fn test_universal_forms() {
        let expanded = expand_collection_approvals(&[approval("a", vec![r(1, 10)])], &ReservedLists)
            .unwrap()
            .remove(0);
        let universal = expanded.to_universal();
        assert_eq!(universal.approval_id_list, AddressList::whitelist(["a"]));
        assert!(universal.amount_tracker_id_list.is_universal());
        assert!(matches!(universal.payload, PermissionPayload::Approval(_)));

        let criteria = expanded.to_criteria_universal();
        assert!(criteria.approval_id_list.is_universal());
    }

    #[test]
    fn test_criteria_stacks_overlap() {
        let approvals = expand_collection_approvals(
            &[approval("a", vec![r(1, 10)]), approval("b", vec![r(5, 15)])],
            &ReservedLists,
        )
        .unwrap();
        let stacks = approval_criteria_stacks(&approvals);
        let sizes: Vec<(UintRange, usize)> = stacks
            .iter()
            .map(|d| match &d.payload {
                PermissionPayload::Criteria(stack) => (d.region.badge_ids.clone(), stack.criteria.len()),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(sizes, vec![(r(1, 4), 1), (r(5, 10), 2), (r(11, 15), 1)]);
    }

    #[test]
    fn test_unsatisfiable_criteria_taint_overlapping_stack() {
        let blocked = CollectionApproval {
            approval_criteria: Some(ApprovalCriteria {
                require_from_equals_initiated_by: true,
                require_from_does_not_equal_initiated_by: true,
                ..ApprovalCriteria::default()
            }),
            ..approval("b", vec![r(5, 15)])
        };
        let approvals =
            expand_collection_approvals(&[approval("a", vec![r(1, 10)]), blocked], &ReservedLists).unwrap();
        let approved: Vec<(UintRange, bool)> = approval_criteria_stacks(&approvals)
            .iter()
            .map(|d| match &d.payload {
                PermissionPayload::Criteria(stack) => (d.region.badge_ids.clone(), stack.is_approved),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(approved, vec![(r(1, 4), true), (r(5, 10), false), (r(11, 15), false)]);
    }
}
