//! Update permission declarations
//!
//! Each declaration names the part of a field it governs and the windows
//! during which updates there are permanently permitted or forbidden. Every
//! kind converts into a [`UniversalPermission`] with an empty payload;
//! dimensions a kind does not use stay universal.

use crate::approvals::id_list;
use crate::universal::{PermissionPayload, UniversalPermission};
use crate::verdict::PermissionKind;
use badges_core::address_list::AddressListResolver;
use badges_core::ranges::{self, fmt_ranges, UintRange};
use badges_core::{BadgesError, Result};
use serde::{Deserialize, Serialize};

/// Converts a typed declaration into its universal form.
pub trait PermissionDeclaration {
    /// Resolve list ids and validate ranges.
    fn to_universal<R: AddressListResolver>(&self, resolver: &R) -> Result<UniversalPermission>;
}

fn checked(list: &[UintRange]) -> Result<Vec<UintRange>> {
    ranges::validate_ranges(list)?;
    Ok(list.to_vec())
}

fn with_windows(
    permission: UniversalPermission,
    permitted: &[UintRange],
    forbidden: &[UintRange],
) -> Result<UniversalPermission> {
    Ok(permission.with_times(checked(permitted)?, checked(forbidden)?))
}

/// Permission over collection approvals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionApprovalPermission {
    pub from_list_id: String,
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    /// Approval id governed; `All` matches every approval
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl PermissionDeclaration for CollectionApprovalPermission {
    fn to_universal<R: AddressListResolver>(&self, resolver: &R) -> Result<UniversalPermission> {
        let universal = UniversalPermission::new(PermissionPayload::Empty)
            .with_badge_ids(checked(&self.badge_ids)?)
            .with_transfer_times(checked(&self.transfer_times)?)
            .with_ownership_times(checked(&self.ownership_times)?)
            .with_transfer_lists(
                resolver.resolve(&self.to_list_id)?,
                resolver.resolve(&self.from_list_id)?,
                resolver.resolve(&self.initiated_by_list_id)?,
            )
            .with_id_lists(
                id_list(&self.approval_id),
                id_list(&self.amount_tracker_id),
                id_list(&self.challenge_tracker_id),
            );
        with_windows(
            universal,
            &self.permanently_permitted_times,
            &self.permanently_forbidden_times,
        )
    }
}

/// Permission over a user's outgoing approvals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOutgoingApprovalPermission {
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl UserOutgoingApprovalPermission {
    /// Collection form with `user` as the only sender.
    pub fn into_collection_permission(self, user: &str) -> CollectionApprovalPermission {
        CollectionApprovalPermission {
            from_list_id: user.to_string(),
            to_list_id: self.to_list_id,
            initiated_by_list_id: self.initiated_by_list_id,
            transfer_times: self.transfer_times,
            badge_ids: self.badge_ids,
            ownership_times: self.ownership_times,
            approval_id: self.approval_id,
            amount_tracker_id: self.amount_tracker_id,
            challenge_tracker_id: self.challenge_tracker_id,
            permanently_permitted_times: self.permanently_permitted_times,
            permanently_forbidden_times: self.permanently_forbidden_times,
        }
    }
}

/// Permission over a user's incoming approvals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserIncomingApprovalPermission {
    pub from_list_id: String,
    pub initiated_by_list_id: String,
    pub transfer_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub approval_id: String,
    pub amount_tracker_id: String,
    pub challenge_tracker_id: String,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl UserIncomingApprovalPermission {
    /// Collection form with `user` as the only recipient.
    pub fn into_collection_permission(self, user: &str) -> CollectionApprovalPermission {
        CollectionApprovalPermission {
            from_list_id: self.from_list_id,
            to_list_id: user.to_string(),
            initiated_by_list_id: self.initiated_by_list_id,
            transfer_times: self.transfer_times,
            badge_ids: self.badge_ids,
            ownership_times: self.ownership_times,
            approval_id: self.approval_id,
            amount_tracker_id: self.amount_tracker_id,
            challenge_tracker_id: self.challenge_tracker_id,
            permanently_permitted_times: self.permanently_permitted_times,
            permanently_forbidden_times: self.permanently_forbidden_times,
        }
    }
}

/// Permission over a timeline-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimedUpdatePermission {
    pub timeline_times: Vec<UintRange>,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl PermissionDeclaration for TimedUpdatePermission {
    fn to_universal<R: AddressListResolver>(&self, _resolver: &R) -> Result<UniversalPermission> {
        let universal = UniversalPermission::new(PermissionPayload::Empty)
            .with_timeline_times(checked(&self.timeline_times)?);
        with_windows(
            universal,
            &self.permanently_permitted_times,
            &self.permanently_forbidden_times,
        )
    }
}

/// Permission over a timeline-valued field keyed by badge id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimedUpdateWithBadgeIdsPermission {
    pub timeline_times: Vec<UintRange>,
    pub badge_ids: Vec<UintRange>,
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl PermissionDeclaration for TimedUpdateWithBadgeIdsPermission {
    fn to_universal<R: AddressListResolver>(&self, _resolver: &R) -> Result<UniversalPermission> {
        let universal = UniversalPermission::new(PermissionPayload::Empty)
            .with_timeline_times(checked(&self.timeline_times)?)
            .with_badge_ids(checked(&self.badge_ids)?);
        with_windows(
            universal,
            &self.permanently_permitted_times,
            &self.permanently_forbidden_times,
        )
    }
}

/// Permission over a plain action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPermission {
    pub permanently_permitted_times: Vec<UintRange>,
    pub permanently_forbidden_times: Vec<UintRange>,
}

impl PermissionDeclaration for ActionPermission {
    fn to_universal<R: AddressListResolver>(&self, _resolver: &R) -> Result<UniversalPermission> {
        with_windows(
            UniversalPermission::new(PermissionPayload::Empty),
            &self.permanently_permitted_times,
            &self.permanently_forbidden_times,
        )
    }
}

/// Permissions held by a collection's manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionPermissions {
    pub can_delete_collection: Vec<ActionPermission>,
    pub can_archive_collection: Vec<TimedUpdatePermission>,
    pub can_update_off_chain_balances_metadata: Vec<TimedUpdatePermission>,
    pub can_update_standards: Vec<TimedUpdatePermission>,
    pub can_update_custom_data: Vec<TimedUpdatePermission>,
    pub can_update_manager: Vec<TimedUpdatePermission>,
    pub can_update_collection_metadata: Vec<TimedUpdatePermission>,
    pub can_update_badge_metadata: Vec<TimedUpdateWithBadgeIdsPermission>,
    pub can_update_collection_approvals: Vec<CollectionApprovalPermission>,
}

/// Permissions a user holds over their own approvals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPermissions {
    pub can_update_outgoing_approvals: Vec<UserOutgoingApprovalPermission>,
    pub can_update_incoming_approvals: Vec<UserIncomingApprovalPermission>,
}

/// Convert a declaration list, in order.
pub fn to_universal_permissions<P, R>(permissions: &[P], resolver: &R) -> Result<Vec<UniversalPermission>>
where
    P: PermissionDeclaration,
    R: AddressListResolver,
{
    permissions.iter().map(|p| p.to_universal(resolver)).collect()
}

/// Reject declarations whose permitted and forbidden windows overlap.
pub fn validate_permission_declarations(kind: PermissionKind, permissions: &[UniversalPermission]) -> Result<()> {
    for permission in permissions {
        let both = ranges::intersection(
            &permission.permanently_permitted_times,
            &permission.permanently_forbidden_times,
        );
        if !both.is_empty() {
            return Err(BadgesError::invalid(format!(
                "{kind}: times {} are both permitted and forbidden",
                fmt_ranges(&both)
            )));
        }
    }
    Ok(())
}
