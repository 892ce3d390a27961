//! Approval criteria
//!
//! Plain data attached to an approval. The engine never interprets criteria;
//! it compares them structurally and stacks them per region.

use badges_core::{Uint, UintRange};
use serde::{Deserialize, Serialize};

/// Everything a transfer must satisfy to use an approval.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalCriteria {
    /// Badges the initiator must own
    pub must_own_badges: Vec<MustOwnBadges>,
    /// Merkle challenges the initiator must solve
    pub merkle_challenges: Vec<MerkleChallenge>,
    /// Balances that must be transferred, decided in advance
    pub predetermined_balances: Option<PredeterminedBalances>,
    /// Amount limits tallied per tracker
    pub approval_amounts: Option<ApprovalAmounts>,
    /// Transfer-count limits tallied per tracker
    pub max_num_transfers: Option<MaxNumTransfers>,
    /// Coins moved alongside the transfer
    pub coin_transfers: Vec<CoinTransfer>,
    /// Zero-knowledge proofs the initiator must provide
    pub zk_proofs: Vec<ZkProof>,
    pub require_to_equals_initiated_by: bool,
    pub require_from_equals_initiated_by: bool,
    pub require_to_does_not_equal_initiated_by: bool,
    pub require_from_does_not_equal_initiated_by: bool,
    /// Skip the sender's outgoing approvals
    pub override_from_outgoing_approvals: bool,
    /// Skip the recipient's incoming approvals
    pub override_to_incoming_approvals: bool,
}

impl ApprovalCriteria {
    /// False when the initiator requirements contradict each other, so no
    /// transfer can ever satisfy them.
    pub fn is_satisfiable(&self) -> bool {
        let to_conflict = self.require_to_equals_initiated_by && self.require_to_does_not_equal_initiated_by;
        let from_conflict =
            self.require_from_equals_initiated_by && self.require_from_does_not_equal_initiated_by;
        !(to_conflict || from_conflict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MustOwnBadges {
    pub collection_id: Uint,
    pub amount_range: Option<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub override_with_current_time: bool,
    pub must_satisfy_for_all_assets: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MerkleChallenge {
    pub root: String,
    pub expected_proof_length: Uint,
    pub use_creator_address_as_leaf: bool,
    pub max_uses_per_leaf: Uint,
    pub uri: String,
    pub custom_data: String,
    pub challenge_tracker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balance {
    pub amount: Uint,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualBalances {
    pub balances: Vec<Balance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncrementedBalances {
    pub start_balances: Vec<Balance>,
    pub increment_badge_ids_by: Uint,
    pub increment_ownership_times_by: Uint,
}

/// How the index into predetermined balances is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredeterminedOrderCalculationMethod {
    pub use_overall_num_transfers: bool,
    pub use_per_to_address_num_transfers: bool,
    pub use_per_from_address_num_transfers: bool,
    pub use_per_initiated_by_address_num_transfers: bool,
    pub use_merkle_challenge_leaf_index: bool,
    pub challenge_tracker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredeterminedBalances {
    pub manual_balances: Vec<ManualBalances>,
    pub incremented_balances: Option<IncrementedBalances>,
    pub order_calculation_method: PredeterminedOrderCalculationMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalAmounts {
    pub overall_approval_amount: Uint,
    pub per_to_address_approval_amount: Uint,
    pub per_from_address_approval_amount: Uint,
    pub per_initiated_by_address_approval_amount: Uint,
    pub amount_tracker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxNumTransfers {
    pub overall_max_num_transfers: Uint,
    pub per_to_address_max_num_transfers: Uint,
    pub per_from_address_max_num_transfers: Uint,
    pub per_initiated_by_address_max_num_transfers: Uint,
    pub amount_tracker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Coin {
    pub denom: String,
    pub amount: Uint,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoinTransfer {
    pub to: String,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZkProof {
    pub verification_key: String,
    pub uri: String,
    pub custom_data: String,
    pub zk_proof_tracker_id: String,
}

/// Criteria applying to one atomic region, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaStack {
    /// Every criteria set whose approval covers the region
    pub criteria: Vec<ApprovalCriteria>,
    /// True only if every stacked criteria set can be satisfied
    pub is_approved: bool,
}

impl CriteriaStack {
    /// Stack holding one criteria set, approved when it is satisfiable.
    pub fn single(criteria: ApprovalCriteria) -> Self {
        Self {
            is_approved: criteria.is_satisfiable(),
            criteria: vec![criteria],
        }
    }

    /// `self` with `later` stacked on top.
    pub fn stacked(&self, later: &CriteriaStack) -> Self {
        let mut criteria = self.criteria.clone();
        criteria.extend(later.criteria.iter().cloned());
        Self {
            criteria,
            is_approved: self.is_approved && later.is_approved,
        }
    }
}
