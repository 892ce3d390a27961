use super::changed_regions;
use crate::check::check_changed_regions;
use crate::fields::{
    CollectionMetadataTimeline, CustomDataTimeline, FieldValue, IsArchivedTimeline,
    ManagerTimeline, Metadata, OffChainBalancesMetadataTimeline, StandardsTimeline,
};
use crate::flatten::first_match_only;
use crate::permissions::{
    to_universal_permissions, validate_permission_declarations, TimedUpdatePermission,
};
use crate::universal::{PermissionDetail, PermissionPayload, UniversalPermission};
use crate::verdict::{PermissionKind, UpdateField, UpdateVerdict};
use badges_core::timeline::validate_timeline;
use badges_core::{full_timeline, EngineConfig, ReservedLists, Result, TimelineItem};
use tracing::{debug, instrument};

fn flatten_timeline<V: Clone>(
    timeline: &[TimelineItem<V>],
    empty_value: V,
    to_value: impl Fn(&V) -> FieldValue,
) -> Vec<PermissionDetail> {
    let declarations: Vec<UniversalPermission> = full_timeline(timeline, empty_value, None)
        .iter()
        .map(|item| {
            UniversalPermission::new(PermissionPayload::Value(to_value(&item.value)))
                .with_timeline_times(item.timeline_times.clone())
        })
        .collect();
    first_match_only(&declarations)
}

/// Check a change to any timeline-valued field.
///
/// Unset times are filled with `empty_value` on both sides, so setting or
/// clearing a value is a change like any other.
#[instrument(level = "debug", skip_all, fields(field = %field))]
pub fn validate_timeline_update<V: Clone>(
    field: UpdateField,
    kind: PermissionKind,
    old: &[TimelineItem<V>],
    new: &[TimelineItem<V>],
    permissions: &[TimedUpdatePermission],
    empty_value: V,
    to_value: impl Fn(&V) -> FieldValue,
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline(old).map_err(|e| e.into_old_value())?;
    validate_timeline(new).map_err(|e| e.into_new_value())?;

    let permissions = to_universal_permissions(permissions, &ReservedLists)?;
    validate_permission_declarations(kind, &permissions)?;

    let old = flatten_timeline(old, empty_value.clone(), &to_value);
    let new = flatten_timeline(new, empty_value, &to_value);
    let changed = changed_regions(&old, &new);
    debug!(changed = changed.len(), "diffed timelines");
    Ok(check_changed_regions(field, &changed, &permissions, config))
}

pub fn validate_manager_update(
    old: &[ManagerTimeline],
    new: &[ManagerTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::Manager,
        PermissionKind::CanUpdateManager,
        old,
        new,
        permissions,
        String::new(),
        |manager| FieldValue::Text(manager.clone()),
        config,
    )
}

pub fn validate_collection_metadata_update(
    old: &[CollectionMetadataTimeline],
    new: &[CollectionMetadataTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::CollectionMetadata,
        PermissionKind::CanUpdateCollectionMetadata,
        old,
        new,
        permissions,
        Metadata::default(),
        |metadata| FieldValue::Metadata(metadata.clone()),
        config,
    )
}

pub fn validate_off_chain_balances_metadata_update(
    old: &[OffChainBalancesMetadataTimeline],
    new: &[OffChainBalancesMetadataTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::OffChainBalancesMetadata,
        PermissionKind::CanUpdateOffChainBalancesMetadata,
        old,
        new,
        permissions,
        Metadata::default(),
        |metadata| FieldValue::Metadata(metadata.clone()),
        config,
    )
}

pub fn validate_standards_update(
    old: &[StandardsTimeline],
    new: &[StandardsTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::Standards,
        PermissionKind::CanUpdateStandards,
        old,
        new,
        permissions,
        Vec::new(),
        |standards| FieldValue::Texts(standards.clone()),
        config,
    )
}

pub fn validate_custom_data_update(
    old: &[CustomDataTimeline],
    new: &[CustomDataTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::CustomData,
        PermissionKind::CanUpdateCustomData,
        old,
        new,
        permissions,
        String::new(),
        |data| FieldValue::Text(data.clone()),
        config,
    )
}

/// Checked against `canArchiveCollection`.
pub fn validate_is_archived_update(
    old: &[IsArchivedTimeline],
    new: &[IsArchivedTimeline],
    permissions: &[TimedUpdatePermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    validate_timeline_update(
        UpdateField::IsArchived,
        PermissionKind::CanArchiveCollection,
        old,
        new,
        permissions,
        false,
        |archived| FieldValue::Flag(*archived),
        config,
    )
}
