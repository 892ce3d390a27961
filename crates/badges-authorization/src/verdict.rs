//! Update verdicts
//!
//! A denial is an expected outcome, not a failure: validators return
//! `Ok(UpdateVerdict::Denied(..))` and reserve `Err` for malformed input.

use crate::universal::Region;
use badges_core::{BadgesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission kinds a manager can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionKind {
    CanDeleteCollection,
    CanArchiveCollection,
    CanUpdateOffChainBalancesMetadata,
    CanUpdateStandards,
    CanUpdateCustomData,
    CanUpdateManager,
    CanUpdateCollectionMetadata,
    CanUpdateBadgeMetadata,
    CanUpdateCollectionApprovals,
    CanUpdateIncomingApprovals,
    CanUpdateOutgoingApprovals,
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CanDeleteCollection => "canDeleteCollection",
            Self::CanArchiveCollection => "canArchiveCollection",
            Self::CanUpdateOffChainBalancesMetadata => "canUpdateOffChainBalancesMetadata",
            Self::CanUpdateStandards => "canUpdateStandards",
            Self::CanUpdateCustomData => "canUpdateCustomData",
            Self::CanUpdateManager => "canUpdateManager",
            Self::CanUpdateCollectionMetadata => "canUpdateCollectionMetadata",
            Self::CanUpdateBadgeMetadata => "canUpdateBadgeMetadata",
            Self::CanUpdateCollectionApprovals => "canUpdateCollectionApprovals",
            Self::CanUpdateIncomingApprovals => "canUpdateIncomingApprovals",
            Self::CanUpdateOutgoingApprovals => "canUpdateOutgoingApprovals",
        };
        f.write_str(name)
    }
}

/// The field an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "permission", rename_all = "camelCase")]
pub enum UpdateField {
    CollectionApprovals,
    IncomingApprovals,
    OutgoingApprovals,
    Manager,
    CollectionMetadata,
    BadgeMetadata,
    OffChainBalancesMetadata,
    Standards,
    CustomData,
    IsArchived,
    DeleteCollection,
    /// The permission declarations themselves
    Permission(PermissionKind),
}

impl fmt::Display for UpdateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollectionApprovals => f.write_str("collection approvals"),
            Self::IncomingApprovals => f.write_str("incoming approvals"),
            Self::OutgoingApprovals => f.write_str("outgoing approvals"),
            Self::Manager => f.write_str("manager"),
            Self::CollectionMetadata => f.write_str("collection metadata"),
            Self::BadgeMetadata => f.write_str("badge metadata"),
            Self::OffChainBalancesMetadata => f.write_str("off-chain balances metadata"),
            Self::Standards => f.write_str("standards"),
            Self::CustomData => f.write_str("custom data"),
            Self::IsArchived => f.write_str("archived status"),
            Self::DeleteCollection => f.write_str("collection deletion"),
            Self::Permission(kind) => write!(f, "permission {kind}"),
        }
    }
}

/// Why a region was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DenialKind {
    /// A forbidden window covers the evaluation time
    Forbidden,
    /// No permitted window covers the region at the evaluation time
    NotPermitted,
    /// An update tried to drop permanently permitted or forbidden times
    PermanentTimesRemoved,
}

/// Soft rejection of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field} update denied ({kind:?}) for {region}")]
pub struct Denial {
    pub field: UpdateField,
    pub kind: DenialKind,
    /// Part of the space the update may not change
    pub region: Region,
}

/// Outcome of validating an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "denial", rename_all = "camelCase")]
pub enum UpdateVerdict {
    Permitted,
    Denied(Denial),
}

impl UpdateVerdict {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Permitted => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Collapse into a `Result`, mapping a denial to `PermissionDenied`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Permitted => Ok(()),
            Self::Denied(denial) => Err(BadgesError::permission_denied(denial.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badges_core::UintRange;

    #[test]
    fn test_denial_into_result() {
        let denial = Denial {
            field: UpdateField::Manager,
            kind: DenialKind::Forbidden,
            region: Region {
                timeline_times: UintRange::new(1u64, 100u64).unwrap(),
                ..Region::universal()
            },
        };
        let verdict = UpdateVerdict::Denied(denial.clone());
        assert!(!verdict.is_permitted());
        assert_eq!(verdict.denial(), Some(&denial));

        let err = verdict.into_result().unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("manager update denied (Forbidden)"));
        assert!(err.to_string().contains("timelineTimes [1-100]"));

        assert!(UpdateVerdict::Permitted.into_result().is_ok());
    }

    #[test]
    fn test_field_display() {
        assert_eq!(
            UpdateField::Permission(PermissionKind::CanUpdateManager).to_string(),
            "permission canUpdateManager"
        );
        assert_eq!(UpdateField::IsArchived.to_string(), "archived status");
    }
}
