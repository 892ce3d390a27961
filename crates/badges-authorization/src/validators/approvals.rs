use super::changed_regions;
use crate::approvals::{
    expand_collection_approvals, CollectionApproval, ExpandedApproval, UserIncomingApproval,
    UserOutgoingApproval,
};
use crate::check::check_changed_regions;
use crate::flatten::first_match_only;
use crate::permissions::{
    to_universal_permissions, validate_permission_declarations, CollectionApprovalPermission,
    UserIncomingApprovalPermission, UserOutgoingApprovalPermission,
};
use crate::universal::{PermissionDetail, UniversalPermission};
use crate::verdict::{PermissionKind, UpdateField, UpdateVerdict};
use badges_core::address_list::AddressListResolver;
use badges_core::{EngineConfig, Result};
use tracing::{debug, instrument};

fn flatten_approvals(approvals: &[ExpandedApproval]) -> Vec<PermissionDetail> {
    let declarations: Vec<UniversalPermission> =
        approvals.iter().map(ExpandedApproval::to_universal).collect();
    first_match_only(&declarations)
}

#[instrument(level = "debug", skip_all, fields(field = %field))]
fn validate_approvals_update<R: AddressListResolver>(
    field: UpdateField,
    kind: PermissionKind,
    old: &[CollectionApproval],
    new: &[CollectionApproval],
    permissions: &[CollectionApprovalPermission],
    resolver: &R,
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    let old = expand_collection_approvals(old, resolver).map_err(|e| e.into_old_value())?;
    let new = expand_collection_approvals(new, resolver).map_err(|e| e.into_new_value())?;

    let permissions = to_universal_permissions(permissions, resolver)?;
    validate_permission_declarations(kind, &permissions)?;

    let changed = changed_regions(&flatten_approvals(&old), &flatten_approvals(&new));
    debug!(changed = changed.len(), "diffed approvals");
    Ok(check_changed_regions(field, &changed, &permissions, config))
}

/// Check a change to a collection's approvals against `canUpdateCollectionApprovals`.
pub fn validate_collection_approvals_update<R: AddressListResolver>(
    old: &[CollectionApproval],
    new: &[CollectionApproval],
    permissions: &[CollectionApprovalPermission],
    resolver: &R,
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_approvals_update(
        UpdateField::CollectionApprovals,
        PermissionKind::CanUpdateCollectionApprovals,
        old,
        new,
        permissions,
        resolver,
        config,
    )
}

/// Check a change to `user`'s incoming approvals.
pub fn validate_user_incoming_approvals_update<R: AddressListResolver>(
    user: &str,
    old: &[UserIncomingApproval],
    new: &[UserIncomingApproval],
    permissions: &[UserIncomingApprovalPermission],
    resolver: &R,
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    let pin = |approvals: &[UserIncomingApproval]| -> Vec<CollectionApproval> {
        approvals
            .iter()
            .cloned()
            .map(|a| a.into_collection_approval(user))
            .collect()
    };
    let permissions: Vec<CollectionApprovalPermission> = permissions
        .iter()
        .cloned()
        .map(|p| p.into_collection_permission(user))
        .collect();
    validate_approvals_update(
        UpdateField::IncomingApprovals,
        PermissionKind::CanUpdateIncomingApprovals,
        &pin(old),
        &pin(new),
        &permissions,
        resolver,
        config,
    )
}

/// Check a change to `user`'s outgoing approvals.
pub fn validate_user_outgoing_approvals_update<R: AddressListResolver>(
    user: &str,
    old: &[UserOutgoingApproval],
    new: &[UserOutgoingApproval],
    permissions: &[UserOutgoingApprovalPermission],
    resolver: &R,
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    let pin = |approvals: &[UserOutgoingApproval]| -> Vec<CollectionApproval> {
        approvals
            .iter()
            .cloned()
            .map(|a| a.into_collection_approval(user))
            .collect()
    };
    let permissions: Vec<CollectionApprovalPermission> = permissions
        .iter()
        .cloned()
        .map(|p| p.into_collection_permission(user))
        .collect();
    validate_approvals_update(
        UpdateField::OutgoingApprovals,
        PermissionKind::CanUpdateOutgoingApprovals,
        &pin(old),
        &pin(new),
        &permissions,
        resolver,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approvals::ApprovalCriteria;
    use crate::verdict::DenialKind;
    use badges_core::{BadgesError, ReservedLists, UintRange};

    const OWNER: &str = "0x1111111111111111111111111111111111111111";

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn approval(id: &str, badges: UintRange) -> CollectionApproval {
        CollectionApproval {
            from_list_id: "Mint".into(),
            to_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![badges],
            ownership_times: vec![UintRange::full()],
            approval_id: id.into(),
            ..CollectionApproval::default()
        }
    }

    fn permission(badges: UintRange, forbidden: bool) -> CollectionApprovalPermission {
        let times = vec![UintRange::full()];
        CollectionApprovalPermission {
            from_list_id: "AllWithMint".into(),
            to_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![badges],
            ownership_times: vec![UintRange::full()],
            approval_id: "All".into(),
            permanently_permitted_times: if forbidden { vec![] } else { times.clone() },
            permanently_forbidden_times: if forbidden { times } else { vec![] },
            ..CollectionApprovalPermission::default()
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::at_time(1_000u64)
    }

    #[test]
    fn test_no_op_is_permitted_without_permissions() {
        let approvals = vec![approval("a", r(1, 10))];
        let verdict =
            validate_collection_approvals_update(&approvals, &approvals, &[], &ReservedLists, &config())
                .unwrap();
        assert!(verdict.is_permitted());
    }

    #[test]
    fn test_changed_criteria_is_a_change() {
        let old = vec![approval("a", r(1, 10))];
        let mut new = old.clone();
        new[0].approval_criteria = Some(ApprovalCriteria {
            require_from_equals_initiated_by: true,
            ..ApprovalCriteria::default()
        });

        let verdict = validate_collection_approvals_update(
            &old,
            &new,
            &[permission(r(1, 10), true)],
            &ReservedLists,
            &config(),
        )
        .unwrap();
        assert_eq!(verdict.denial().unwrap().kind, DenialKind::Forbidden);
    }

    #[test]
    fn test_malformed_sides_are_labelled() {
        let good = vec![approval("a", r(1, 10))];
        let bad = vec![approval("a", r(1, 10)), approval("a", r(11, 20))];

        let err = validate_collection_approvals_update(&bad, &good, &[], &ReservedLists, &config())
            .unwrap_err();
        assert!(matches!(err, BadgesError::InvalidOldValue { .. }));

        let err = validate_collection_approvals_update(&good, &bad, &[], &ReservedLists, &config())
            .unwrap_err();
        assert!(matches!(err, BadgesError::InvalidNewValue { .. }));
    }

    #[test]
    fn test_user_outgoing_scope_is_the_owner() {
        let new = vec![UserOutgoingApproval {
            to_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![r(1, 5)],
            ownership_times: vec![UintRange::full()],
            approval_id: "gift".into(),
            ..UserOutgoingApproval::default()
        }];
        let permissions = vec![UserOutgoingApprovalPermission {
            to_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![UintRange::full()],
            ownership_times: vec![UintRange::full()],
            approval_id: "All".into(),
            permanently_permitted_times: vec![UintRange::full()],
            ..UserOutgoingApprovalPermission::default()
        }];

        let verdict = validate_user_outgoing_approvals_update(
            OWNER,
            &[],
            &new,
            &permissions,
            &ReservedLists,
            &config(),
        )
        .unwrap();
        assert!(verdict.is_permitted());

        let verdict =
            validate_user_outgoing_approvals_update(OWNER, &[], &new, &[], &ReservedLists, &config())
                .unwrap();
        let denial = verdict.denial().unwrap();
        assert_eq!(denial.field, UpdateField::OutgoingApprovals);
        assert!(denial.region.from_list.contains(OWNER));
    }

    #[test]
    fn test_user_incoming_forbidden() {
        let new = vec![UserIncomingApproval {
            from_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![r(1, 5)],
            ownership_times: vec![UintRange::full()],
            approval_id: "accept".into(),
            ..UserIncomingApproval::default()
        }];
        let permissions = vec![UserIncomingApprovalPermission {
            from_list_id: "AllWithMint".into(),
            initiated_by_list_id: "AllWithMint".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![UintRange::full()],
            ownership_times: vec![UintRange::full()],
            approval_id: "All".into(),
            permanently_forbidden_times: vec![UintRange::full()],
            ..UserIncomingApprovalPermission::default()
        }];

        let verdict = validate_user_incoming_approvals_update(
            OWNER,
            &[],
            &new,
            &permissions,
            &ReservedLists,
            &config(),
        )
        .unwrap();
        let denial = verdict.denial().unwrap();
        assert_eq!(denial.kind, DenialKind::Forbidden);
        assert_eq!(denial.field, UpdateField::IncomingApprovals);
    }
}
