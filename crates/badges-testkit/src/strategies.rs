//! Property test strategies for permission engine types
//!
//! Values live in a small domain (`1..=DOMAIN`) so generated declarations
//! overlap often and point-wise checks stay cheap.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use badges_authorization::{FieldValue, PermissionPayload, TimedUpdatePermission, UniversalPermission};
use badges_core::{TimelineItem, UintRange};

/// Upper bound of generated ids and times.
pub const DOMAIN: u64 = 64;

/// Strategy for a range inside `[1, DOMAIN]`.
pub fn arb_range() -> impl Strategy<Value = UintRange> {
    (1..=DOMAIN, 0..16u64).prop_map(|(start, len)| {
        let end = (start + len).min(DOMAIN);
        UintRange::new(start, end).unwrap()
    })
}

/// Strategy for an unnormalized range list.
pub fn arb_ranges() -> impl Strategy<Value = Vec<UintRange>> {
    prop::collection::vec(arb_range(), 0..4)
}

/// Strategy for a non-empty range list.
pub fn arb_nonempty_ranges() -> impl Strategy<Value = Vec<UintRange>> {
    prop::collection::vec(arb_range(), 1..4)
}

/// Strategy for a timeline whose items never overlap.
///
/// Cut points split `[1, DOMAIN]` into consecutive windows; each window gets
/// one of a few values or is left unset.
pub fn arb_text_timeline() -> impl Strategy<Value = Vec<TimelineItem<String>>> {
    (
        prop::collection::btree_set(2..=DOMAIN, 0..5),
        prop::collection::vec(prop::option::of(0..3u8), 6),
    )
        .prop_map(|(cuts, values)| {
            let mut bounds: Vec<u64> = vec![1];
            bounds.extend(cuts);
            bounds.push(DOMAIN + 1);

            bounds
                .windows(2)
                .zip(values)
                .filter_map(|(window, value)| {
                    let value = value?;
                    let times = UintRange::new(window[0], window[1] - 1).unwrap();
                    Some(TimelineItem::new(vec![times], format!("value-{value}")))
                })
                .collect()
        })
}

/// Strategy for timeline permissions with arbitrary windows.
pub fn arb_timed_permissions() -> impl Strategy<Value = Vec<TimedUpdatePermission>> {
    prop::collection::vec(
        (arb_nonempty_ranges(), arb_ranges(), arb_ranges()).prop_map(
            |(timeline_times, permitted, forbidden)| TimedUpdatePermission {
                timeline_times,
                permanently_permitted_times: permitted,
                permanently_forbidden_times: forbidden,
            },
        ),
        0..4,
    )
}

/// Strategy for universal declarations over badge ids and timeline times,
/// each carrying one of a few text payloads.
pub fn arb_universal_permissions() -> impl Strategy<Value = Vec<UniversalPermission>> {
    prop::collection::vec(
        (arb_nonempty_ranges(), arb_nonempty_ranges(), 0..3u8).prop_map(|(badges, times, tag)| {
            UniversalPermission::new(PermissionPayload::Value(FieldValue::Text(format!("p{tag}"))))
                .with_badge_ids(badges)
                .with_timeline_times(times)
        }),
        0..5,
    )
}
