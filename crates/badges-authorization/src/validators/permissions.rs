use crate::flatten::first_match_only;
use crate::overlap::overlaps_and_non_overlaps;
use crate::permissions::{
    to_universal_permissions, validate_permission_declarations, ActionPermission,
    CollectionApprovalPermission, CollectionPermissions, PermissionDeclaration,
    TimedUpdatePermission, TimedUpdateWithBadgeIdsPermission, UserIncomingApprovalPermission,
    UserOutgoingApprovalPermission, UserPermissions,
};
use crate::universal::{PermissionDetail, Region};
use crate::verdict::{Denial, DenialKind, PermissionKind, UpdateField, UpdateVerdict};
use badges_core::address_list::AddressListResolver;
use badges_core::ranges;
use badges_core::{Result, UintRange};
use tracing::{debug, instrument};

fn flatten_declarations<P, R>(permissions: &[P], kind: PermissionKind, resolver: &R) -> Result<Vec<PermissionDetail>>
where
    P: PermissionDeclaration,
    R: AddressListResolver,
{
    let universal = to_universal_permissions(permissions, resolver)?;
    validate_permission_declarations(kind, &universal)?;
    Ok(first_match_only(&universal))
}

fn has_times(detail: &PermissionDetail) -> bool {
    !detail.permanently_permitted_times.is_empty() || !detail.permanently_forbidden_times.is_empty()
}

fn keeps(old: &[UintRange], new: &[UintRange]) -> bool {
    ranges::is_subset(old, new)
}

fn removed(kind: PermissionKind, region: Region) -> UpdateVerdict {
    UpdateVerdict::Denied(Denial {
        field: UpdateField::Permission(kind),
        kind: DenialKind::PermanentTimesRemoved,
        region,
    })
}

/// Check a change to one permission's declarations.
///
/// Permanently permitted and forbidden times are permanent: every region of
/// the old declarations must keep at least the times it had.
#[instrument(level = "debug", skip_all, fields(kind = %kind))]
pub fn validate_permission_update<P, R>(
    kind: PermissionKind,
    old: &[P],
    new: &[P],
    resolver: &R,
) -> Result<UpdateVerdict>
where
    P: PermissionDeclaration,
    R: AddressListResolver,
{
    let old = flatten_declarations(old, kind, resolver).map_err(|e| e.into_old_value())?;
    let new = flatten_declarations(new, kind, resolver).map_err(|e| e.into_new_value())?;

    let diff = overlaps_and_non_overlaps(&old, &new);
    if let Some(dropped) = diff.first_only.into_iter().find(has_times) {
        debug!(region = %dropped.region, "declaration with permanent times removed");
        return Ok(removed(kind, dropped.region));
    }

    for overlap in diff.overlaps {
        let (before, after) = (&overlap.first, &overlap.second);
        if !keeps(&before.permanently_permitted_times, &after.permanently_permitted_times)
            || !keeps(&before.permanently_forbidden_times, &after.permanently_forbidden_times)
        {
            debug!(region = %overlap.region, "permanent times shrunk");
            return Ok(removed(kind, overlap.region));
        }
    }

    Ok(UpdateVerdict::Permitted)
}

pub fn validate_action_permission_update<R: AddressListResolver>(
    kind: PermissionKind,
    old: &[ActionPermission],
    new: &[ActionPermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    validate_permission_update(kind, old, new, resolver)
}

pub fn validate_timed_update_permission_update<R: AddressListResolver>(
    kind: PermissionKind,
    old: &[TimedUpdatePermission],
    new: &[TimedUpdatePermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    validate_permission_update(kind, old, new, resolver)
}

pub fn validate_timed_update_with_badge_ids_permission_update<R: AddressListResolver>(
    old: &[TimedUpdateWithBadgeIdsPermission],
    new: &[TimedUpdateWithBadgeIdsPermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    validate_permission_update(PermissionKind::CanUpdateBadgeMetadata, old, new, resolver)
}

pub fn validate_collection_approval_permission_update<R: AddressListResolver>(
    old: &[CollectionApprovalPermission],
    new: &[CollectionApprovalPermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    validate_permission_update(PermissionKind::CanUpdateCollectionApprovals, old, new, resolver)
}

pub fn validate_user_incoming_approval_permission_update<R: AddressListResolver>(
    user: &str,
    old: &[UserIncomingApprovalPermission],
    new: &[UserIncomingApprovalPermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    let pin = |permissions: &[UserIncomingApprovalPermission]| -> Vec<CollectionApprovalPermission> {
        permissions
            .iter()
            .cloned()
            .map(|p| p.into_collection_permission(user))
            .collect()
    };
    validate_permission_update(
        PermissionKind::CanUpdateIncomingApprovals,
        &pin(old),
        &pin(new),
        resolver,
    )
}

pub fn validate_user_outgoing_approval_permission_update<R: AddressListResolver>(
    user: &str,
    old: &[UserOutgoingApprovalPermission],
    new: &[UserOutgoingApprovalPermission],
    resolver: &R,
) -> Result<UpdateVerdict> {
    let pin = |permissions: &[UserOutgoingApprovalPermission]| -> Vec<CollectionApprovalPermission> {
        permissions
            .iter()
            .cloned()
            .map(|p| p.into_collection_permission(user))
            .collect()
    };
    validate_permission_update(
        PermissionKind::CanUpdateOutgoingApprovals,
        &pin(old),
        &pin(new),
        resolver,
    )
}

/// Check every permission of a collection; the first denial is returned.
pub fn validate_collection_permissions_update<R: AddressListResolver>(
    old: &CollectionPermissions,
    new: &CollectionPermissions,
    resolver: &R,
) -> Result<UpdateVerdict> {
    use PermissionKind::*;

    let timed = [
        (CanArchiveCollection, &old.can_archive_collection, &new.can_archive_collection),
        (
            CanUpdateOffChainBalancesMetadata,
            &old.can_update_off_chain_balances_metadata,
            &new.can_update_off_chain_balances_metadata,
        ),
        (CanUpdateStandards, &old.can_update_standards, &new.can_update_standards),
        (CanUpdateCustomData, &old.can_update_custom_data, &new.can_update_custom_data),
        (CanUpdateManager, &old.can_update_manager, &new.can_update_manager),
        (
            CanUpdateCollectionMetadata,
            &old.can_update_collection_metadata,
            &new.can_update_collection_metadata,
        ),
    ];

    let verdict = validate_action_permission_update(
        CanDeleteCollection,
        &old.can_delete_collection,
        &new.can_delete_collection,
        resolver,
    )?;
    if !verdict.is_permitted() {
        return Ok(verdict);
    }
    for (kind, old, new) in timed {
        let verdict = validate_timed_update_permission_update(kind, old, new, resolver)?;
        if !verdict.is_permitted() {
            return Ok(verdict);
        }
    }
    let verdict = validate_timed_update_with_badge_ids_permission_update(
        &old.can_update_badge_metadata,
        &new.can_update_badge_metadata,
        resolver,
    )?;
    if !verdict.is_permitted() {
        return Ok(verdict);
    }
    validate_collection_approval_permission_update(
        &old.can_update_collection_approvals,
        &new.can_update_collection_approvals,
        resolver,
    )
}

/// Check both approval permissions a user holds.
pub fn validate_user_permissions_update<R: AddressListResolver>(
    user: &str,
    old: &UserPermissions,
    new: &UserPermissions,
    resolver: &R,
) -> Result<UpdateVerdict> {
    let verdict = validate_user_incoming_approval_permission_update(
        user,
        &old.can_update_incoming_approvals,
        &new.can_update_incoming_approvals,
        resolver,
    )?;
    if !verdict.is_permitted() {
        return Ok(verdict);
    }
    validate_user_outgoing_approval_permission_update(
        user,
        &old.can_update_outgoing_approvals,
        &new.can_update_outgoing_approvals,
        resolver,
    )
}
