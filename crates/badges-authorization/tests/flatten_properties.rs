//! Flattening and validation properties
//!
//! - flattened details are pairwise disjoint and tile the declared space
//! - every point takes the payload of the first declaration covering it
//! - a timeline update that changes nothing is always permitted
//! - a leading forbid-everything declaration denies any real change
//! - a leading permit-everything declaration shadows any later forbid

use badges_authorization::*;
use badges_core::{ranges, Uint, UintRange};
use badges_testkit::strategies::{arb_text_timeline, arb_timed_permissions, arb_universal_permissions, DOMAIN};
use badges_testkit::{config_at, timed_permission};
use proptest::prelude::*;

const STEP: u64 = 3;

fn contains_point(region: &Region, badge: &Uint, time: &Uint) -> bool {
    region.badge_ids.contains(badge) && region.timeline_times.contains(time)
}

fn declares_point(permission: &UniversalPermission, badge: &Uint, time: &Uint) -> bool {
    ranges::contains_id(badge, &permission.badge_ids) && ranges::contains_id(time, &permission.timeline_times)
}

fn points() -> impl Iterator<Item = (Uint, Uint)> {
    (1..=DOMAIN)
        .step_by(STEP as usize)
        .flat_map(|b| (1..=DOMAIN).step_by(STEP as usize).map(move |t| (Uint::from(b), Uint::from(t))))
}

proptest! {
    #[test]
    fn flattened_details_tile_declared_space(permissions in arb_universal_permissions()) {
        let details = first_match_only(&permissions);
        for (badge, time) in points() {
            let covering = details
                .iter()
                .filter(|d| contains_point(&d.region, &badge, &time))
                .count();
            let declared = permissions.iter().any(|p| declares_point(p, &badge, &time));
            prop_assert!(covering <= 1, "details overlap at ({}, {})", badge, time);
            prop_assert_eq!(covering == 1, declared);
        }
    }

    #[test]
    fn first_declaration_wins(permissions in arb_universal_permissions()) {
        let details = first_match_only(&permissions);
        for (badge, time) in points() {
            let expected = permissions
                .iter()
                .find(|p| declares_point(p, &badge, &time))
                .map(|p| &p.payload);
            let actual = details
                .iter()
                .find(|d| contains_point(&d.region, &badge, &time))
                .map(|d| &d.payload);
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn output_sorted_by_badge_start(permissions in arb_universal_permissions()) {
        let details = first_match_only(&permissions);
        for pair in details.windows(2) {
            prop_assert!(pair[0].region.badge_ids.start <= pair[1].region.badge_ids.start);
        }
    }

    #[test]
    fn no_op_update_is_permitted(
        timeline in arb_text_timeline(),
        permissions in arb_timed_permissions(),
        now in 1..=DOMAIN,
    ) {
        // Declarations with conflicting windows are malformed, not denied.
        let config = config_at(now);
        match validate_manager_update(&timeline, &timeline, &permissions, &config) {
            Ok(verdict) => prop_assert!(verdict.is_permitted()),
            Err(err) => prop_assert!(matches!(err, badges_core::BadgesError::Invalid { .. }), "expected BadgesError::Invalid, got {:?}", err),
        }
    }

    #[test]
    fn leading_forbid_denies_changes(
        old in arb_text_timeline(),
        new in arb_text_timeline(),
        permitted in prop::collection::vec(
            arb_timed_permission_permitting_everything(), 0..3
        ),
        now in 1..=DOMAIN,
    ) {
        let mut permissions = vec![timed_permission(vec![UintRange::full()], vec![], vec![UintRange::full()])];
        permissions.extend(permitted);

        let verdict = validate_manager_update(&old, &new, &permissions, &config_at(now)).unwrap();
        if old == new {
            prop_assert!(verdict.is_permitted());
        } else if let Some(denial) = verdict.denial() {
            prop_assert_eq!(denial.kind, DenialKind::Forbidden);
        }
    }

    #[test]
    fn leading_permit_shadows_later_forbid(
        old in arb_text_timeline(),
        new in arb_text_timeline(),
        now in 1..=DOMAIN,
    ) {
        let permissions = vec![
            timed_permission(vec![UintRange::full()], vec![UintRange::full()], vec![]),
            timed_permission(vec![UintRange::full()], vec![], vec![UintRange::full()]),
        ];
        let verdict = validate_manager_update(&old, &new, &permissions, &config_at(now)).unwrap();
        prop_assert!(verdict.is_permitted());
    }
}

fn arb_timed_permission_permitting_everything() -> impl Strategy<Value = TimedUpdatePermission> {
    badges_testkit::strategies::arb_nonempty_ranges()
        .prop_map(|times| timed_permission(times, vec![UintRange::full()], vec![]))
}

#[test]
fn changed_timeline_with_leading_forbid_is_denied() {
    let old = badges_testkit::timeline(&[(1, 10, "a".to_string())]);
    let new = badges_testkit::timeline(&[(1, 10, "b".to_string())]);
    let permissions = vec![
        timed_permission(vec![UintRange::full()], vec![], vec![UintRange::full()]),
        timed_permission(vec![UintRange::full()], vec![UintRange::full()], vec![]),
    ];
    let verdict = validate_manager_update(&old, &new, &permissions, &config_at(5)).unwrap();
    assert_eq!(verdict.denial().unwrap().kind, DenialKind::Forbidden);
}
