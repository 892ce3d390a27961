//! Badges Authorization - permission flattening and update validation
//!
//! Answers whether a proposed change to a collection (its transfer approvals
//! or one of its timeline-valued fields) is allowed by the update permissions
//! currently granted.
//!
//! # Pipeline
//!
//! - Every value and permission is converted to a `UniversalPermission` over
//!   ten dimensions (badge ids, timeline/transfer/ownership times, to/from/
//!   initiated-by lists, approval/amount-tracker/challenge-tracker ids)
//! - `first_match_only` flattens declarations into non-overlapping details,
//!   earlier declarations shadowing later ones
//! - `overlaps_and_non_overlaps` diffs the old and new flattened values
//! - Changed regions are checked against the permission declarations at the
//!   evaluation time from `EngineConfig`
//!
//! # Verdicts
//!
//! Validators return `Ok(UpdateVerdict::Permitted)`,
//! `Ok(UpdateVerdict::Denied(Denial))` for an update the permissions reject,
//! or `Err(BadgesError)` when an input is malformed.

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Transfer approvals and their criteria
pub mod approvals;

/// Coverage check of changed regions
pub mod check;

/// Timeline-valued collection fields
pub mod fields;

/// First-match-only flattening
pub mod flatten;

/// Overlap/diff engine
pub mod overlap;

/// Update permission declarations
pub mod permissions;

/// Universal permissions and regions
pub mod universal;

/// Update validators
pub mod validators;

/// Update verdicts
pub mod verdict;

pub use approvals::{
    approval_criteria_stacks, expand_collection_approvals, ApprovalCriteria, ApprovalValue,
    CollectionApproval, CriteriaStack, ExpandedApproval, UserIncomingApproval,
    UserOutgoingApproval,
};
pub use check::{check_action_permission, check_changed_regions};
pub use fields::{BadgeMetadata, FieldValue, Metadata};
pub use flatten::first_match_only;
pub use overlap::{overlaps_and_non_overlaps, remove_overlaps, Overlap, OverlapDiff};
pub use permissions::{
    ActionPermission, CollectionApprovalPermission, CollectionPermissions, PermissionDeclaration,
    TimedUpdatePermission, TimedUpdateWithBadgeIdsPermission, UserIncomingApprovalPermission,
    UserOutgoingApprovalPermission, UserPermissions,
};
pub use universal::{PermissionDetail, PermissionPayload, Region, UniversalPermission};
pub use validators::*;
pub use verdict::{Denial, DenialKind, PermissionKind, UpdateField, UpdateVerdict};
