//! Coverage check of changed regions against permission declarations

use crate::flatten::first_match_only;
use crate::permissions::{to_universal_permissions, ActionPermission};
use crate::universal::{Region, UniversalPermission};
use crate::verdict::{Denial, DenialKind, UpdateField, UpdateVerdict};
use badges_core::{EngineConfig, ReservedLists, Result, UnhandledRegionPolicy};
use tracing::debug;

/// Check every changed region against `permissions`.
///
/// Declarations are flattened first-match-only, so a region belongs to the
/// earliest declaration covering it and later declarations cannot deny or
/// permit it. A region touching a detail forbidden at the evaluation time is
/// denied, even if that detail also permits it. Under
/// [`UnhandledRegionPolicy::RequirePermitted`] the region must also be fully
/// covered by details permitted at that time.
pub fn check_changed_regions(
    field: UpdateField,
    changed: &[Region],
    permissions: &[UniversalPermission],
    config: &EngineConfig,
) -> UpdateVerdict {
    if changed.is_empty() {
        return UpdateVerdict::Permitted;
    }
    let now = config.now();
    let details = first_match_only(permissions);

    let forbidden: Vec<&Region> = details
        .iter()
        .filter(|detail| detail.is_forbidden_at(&now))
        .map(|detail| &detail.region)
        .collect();

    for region in changed {
        for handled in &forbidden {
            if let (_, Some(overlap)) = region.split(handled) {
                debug!(%field, region = %overlap, "changed region is forbidden");
                return deny(field, DenialKind::Forbidden, overlap);
            }
        }
    }

    if config.unhandled_regions == UnhandledRegionPolicy::Neutral {
        return UpdateVerdict::Permitted;
    }

    let permitted: Vec<&Region> = details
        .iter()
        .filter(|detail| detail.is_permitted_at(&now) && !detail.is_forbidden_at(&now))
        .map(|detail| &detail.region)
        .collect();

    for region in changed {
        let uncovered = permitted.iter().fold(vec![region.clone()], |pieces, handled| {
            pieces
                .iter()
                .flat_map(|piece| piece.split(handled).0)
                .collect()
        });
        if let Some(first) = uncovered.into_iter().next() {
            debug!(%field, region = %first, "changed region is not permitted");
            return deny(field, DenialKind::NotPermitted, first);
        }
    }

    UpdateVerdict::Permitted
}

/// Check a plain action such as deleting the collection.
pub fn check_action_permission(
    field: UpdateField,
    permissions: &[ActionPermission],
    config: &EngineConfig,
) -> Result<UpdateVerdict> {
    let universal = to_universal_permissions(permissions, &ReservedLists)?;
    Ok(check_changed_regions(field, &[Region::universal()], &universal, config))
}

fn deny(field: UpdateField, kind: DenialKind, region: Region) -> UpdateVerdict {
    UpdateVerdict::Denied(Denial {
        field,
        kind,
        region,
    })
}
