//! Update validators
//!
//! Every validator follows the same shape: flatten the old and new values,
//! diff them, collect the regions whose payload changed and check those
//! against the granted permission declarations.

mod approvals;
mod badge_metadata;
mod permissions;
mod timeline;

pub use approvals::{
    validate_collection_approvals_update, validate_user_incoming_approvals_update,
    validate_user_outgoing_approvals_update,
};
pub use badge_metadata::validate_badge_metadata_update;
pub use permissions::{
    validate_action_permission_update, validate_collection_approval_permission_update,
    validate_collection_permissions_update, validate_permission_update,
    validate_timed_update_permission_update, validate_timed_update_with_badge_ids_permission_update,
    validate_user_incoming_approval_permission_update,
    validate_user_outgoing_approval_permission_update, validate_user_permissions_update,
};
pub use timeline::{
    validate_collection_metadata_update, validate_custom_data_update, validate_is_archived_update,
    validate_manager_update, validate_off_chain_balances_metadata_update, validate_standards_update,
    validate_timeline_update,
};

use crate::overlap::overlaps_and_non_overlaps;
use crate::universal::{PermissionDetail, Region};

/// Regions where `old` and `new` differ.
///
/// A region present on one side only is a change, as is a shared region whose
/// payloads are not structurally equal.
pub fn changed_regions(old: &[PermissionDetail], new: &[PermissionDetail]) -> Vec<Region> {
    let diff = overlaps_and_non_overlaps(old, new);
    diff.first_only
        .into_iter()
        .chain(diff.second_only)
        .map(|detail| detail.region)
        .chain(
            diff.overlaps
                .into_iter()
                .filter(|overlap| !overlap.is_unchanged())
                .map(|overlap| overlap.region),
        )
        .collect()
}
