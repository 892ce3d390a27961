use super::changed_regions;
use crate::check::check_changed_regions;
use crate::fields::{BadgeMetadataTimeline, FieldValue, Metadata};
use crate::flatten::first_match_only;
use crate::permissions::{
    to_universal_permissions, validate_permission_declarations, TimedUpdateWithBadgeIdsPermission,
};
use crate::universal::{PermissionDetail, PermissionPayload, UniversalPermission};
use crate::verdict::{PermissionKind, UpdateField, UpdateVerdict};
use badges_core::ranges::{self, UintRange};
use badges_core::timeline::validate_timeline;
use badges_core::{full_timeline, EngineConfig, ReservedLists, Result};
use tracing::{debug, instrument};

// Each timeline item becomes one declaration per metadata entry plus one for
// the badge ids the item leaves without metadata.
fn flatten_badge_metadata(timeline: &[BadgeMetadataTimeline]) -> Result<Vec<PermissionDetail>> {
    validate_timeline(timeline)?;

    let mut declarations = Vec::new();
    for item in full_timeline(timeline, Vec::new(), None) {
        let mut described: Vec<UintRange> = Vec::new();
        for entry in &item.value {
            ranges::validate_ranges(&entry.badge_ids)?;
            described.extend_from_slice(&entry.badge_ids);
            declarations.push(declaration(
                &item.timeline_times,
                entry.badge_ids.clone(),
                entry.metadata(),
            ));
        }

        let undescribed = ranges::invert_full(&described);
        if !undescribed.is_empty() {
            declarations.push(declaration(&item.timeline_times, undescribed, Metadata::default()));
        }
    }
    Ok(first_match_only(&declarations))
}

fn declaration(times: &[UintRange], badge_ids: Vec<UintRange>, metadata: Metadata) -> UniversalPermission {
    UniversalPermission::new(PermissionPayload::Value(FieldValue::Metadata(metadata)))
        .with_timeline_times(times.to_vec())
        .with_badge_ids(badge_ids)
}

/// Check a change to per-badge metadata against `canUpdateBadgeMetadata`.
#[instrument(level = "debug", skip_all)]
pub fn validate_badge_metadata_update(
    old: &[BadgeMetadataTimeline],
    new: &[BadgeMetadataTimeline],
    permissions: &[TimedUpdateWithBadgeIdsPermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    let old = flatten_badge_metadata(old).map_err(|e| e.into_old_value())?;
    let new = flatten_badge_metadata(new).map_err(|e| e.into_new_value())?;

    let permissions = to_universal_permissions(permissions, &ReservedLists)?;
    validate_permission_declarations(PermissionKind::CanUpdateBadgeMetadata, &permissions)?;

    let changed = changed_regions(&old, &new);
    debug!(changed = changed.len(), "diffed badge metadata");
    Ok(check_changed_regions(
        UpdateField::BadgeMetadata,
        &changed,
        &permissions,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::BadgeMetadata;
    use crate::verdict::DenialKind;
    use badges_core::{BadgesError, Uint};

    fn r(start: u64, end: u64) -> UintRange {
        UintRange::new(start, end).unwrap()
    }

    fn metadata(uri: &str, badges: UintRange) -> BadgeMetadata {
        BadgeMetadata {
            uri: uri.into(),
            custom_data: String::new(),
            badge_ids: vec![badges],
        }
    }

    #[test]
    fn test_flatten_fills_undescribed_badges() {
        let timeline = vec![BadgeMetadataTimeline::always(vec![metadata("ipfs://a", r(1, 10))])];
        let details = flatten_badge_metadata(&timeline).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].region.badge_ids, r(1, 10));
        assert_eq!(
            details[1].payload,
            PermissionPayload::Value(FieldValue::Metadata(Metadata::default()))
        );
    }

    #[test]
    fn test_locked_badges_cannot_change() {
        let old = vec![BadgeMetadataTimeline::always(vec![
            metadata("ipfs://a", r(1, 10)),
            metadata("ipfs://b", r(11, 20)),
        ])];
        let permissions = vec![
            TimedUpdateWithBadgeIdsPermission {
                timeline_times: vec![UintRange::full()],
                badge_ids: vec![r(1, 10)],
                permanently_permitted_times: vec![],
                permanently_forbidden_times: vec![UintRange::full()],
            },
            TimedUpdateWithBadgeIdsPermission {
                timeline_times: vec![UintRange::full()],
                badge_ids: vec![UintRange::full()],
                permanently_permitted_times: vec![UintRange::full()],
                permanently_forbidden_times: vec![],
            },
        ];
        let config = EngineConfig::at_time(10u64);

        let mut new = old.clone();
        new[0].value[1].uri = "ipfs://c".into();
        let verdict = validate_badge_metadata_update(&old, &new, &permissions, &config).unwrap();
        assert!(verdict.is_permitted());

        new[0].value[0].uri = "ipfs://d".into();
        let verdict = validate_badge_metadata_update(&old, &new, &permissions, &config).unwrap();
        let denial = verdict.denial().unwrap();
        assert_eq!(denial.kind, DenialKind::Forbidden);
        assert_eq!(denial.region.badge_ids, r(1, 10));
    }

    #[test]
    fn test_zero_badge_id_rejected() {
        let bad = vec![BadgeMetadataTimeline::always(vec![BadgeMetadata {
            badge_ids: vec![UintRange {
                start: Uint::zero(),
                end: Uint::one(),
            }],
            ..BadgeMetadata::default()
        }])];
        let err = validate_badge_metadata_update(&[], &bad, &[], &EngineConfig::at_time(1u64)).unwrap_err();
        assert!(matches!(err, BadgesError::InvalidNewValue { .. }));
    }
}
