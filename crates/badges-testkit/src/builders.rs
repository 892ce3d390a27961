//! Builders for approvals, permissions and timelines

use badges_authorization::{
    ApprovalCriteria, CollectionApproval, CollectionApprovalPermission, TimedUpdatePermission,
    TimedUpdateWithBadgeIdsPermission,
};
use badges_core::{EngineConfig, TimelineItem, UintRange};

/// `[start, end]`; panics on `start > end`.
pub fn range(start: u64, end: u64) -> UintRange {
    UintRange::new(start, end).expect("valid range")
}

/// `[1, MAX_UINT_64]`
pub fn full() -> Vec<UintRange> {
    vec![UintRange::full()]
}

/// Configuration pinned to `time`.
pub fn config_at(time: u64) -> EngineConfig {
    EngineConfig::at_time(time)
}

/// Collection approval over every address and time unless narrowed.
#[derive(Debug, Clone)]
pub struct ApprovalBuilder {
    approval: CollectionApproval,
}

impl ApprovalBuilder {
    pub fn new(approval_id: &str) -> Self {
        Self {
            approval: CollectionApproval {
                from_list_id: "AllWithMint".into(),
                to_list_id: "AllWithMint".into(),
                initiated_by_list_id: "AllWithMint".into(),
                transfer_times: full(),
                badge_ids: full(),
                ownership_times: full(),
                approval_id: approval_id.into(),
                ..CollectionApproval::default()
            },
        }
    }

    pub fn from(mut self, list_id: &str) -> Self {
        self.approval.from_list_id = list_id.into();
        self
    }

    pub fn to(mut self, list_id: &str) -> Self {
        self.approval.to_list_id = list_id.into();
        self
    }

    pub fn initiated_by(mut self, list_id: &str) -> Self {
        self.approval.initiated_by_list_id = list_id.into();
        self
    }

    pub fn badge_ids(mut self, badge_ids: Vec<UintRange>) -> Self {
        self.approval.badge_ids = badge_ids;
        self
    }

    pub fn transfer_times(mut self, transfer_times: Vec<UintRange>) -> Self {
        self.approval.transfer_times = transfer_times;
        self
    }

    pub fn ownership_times(mut self, ownership_times: Vec<UintRange>) -> Self {
        self.approval.ownership_times = ownership_times;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.approval.uri = uri.into();
        self
    }

    pub fn criteria(mut self, criteria: ApprovalCriteria) -> Self {
        self.approval.approval_criteria = Some(criteria);
        self
    }

    pub fn build(self) -> CollectionApproval {
        self.approval
    }
}

/// Permission over every approval unless narrowed; no windows by default.
#[derive(Debug, Clone)]
pub struct ApprovalPermissionBuilder {
    permission: CollectionApprovalPermission,
}

impl Default for ApprovalPermissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalPermissionBuilder {
    pub fn new() -> Self {
        Self {
            permission: CollectionApprovalPermission {
                from_list_id: "AllWithMint".into(),
                to_list_id: "AllWithMint".into(),
                initiated_by_list_id: "AllWithMint".into(),
                transfer_times: full(),
                badge_ids: full(),
                ownership_times: full(),
                approval_id: "All".into(),
                ..CollectionApprovalPermission::default()
            },
        }
    }

    pub fn badge_ids(mut self, badge_ids: Vec<UintRange>) -> Self {
        self.permission.badge_ids = badge_ids;
        self
    }

    pub fn from(mut self, list_id: &str) -> Self {
        self.permission.from_list_id = list_id.into();
        self
    }

    pub fn approval_id(mut self, approval_id: &str) -> Self {
        self.permission.approval_id = approval_id.into();
        self
    }

    pub fn permitted(mut self, times: Vec<UintRange>) -> Self {
        self.permission.permanently_permitted_times = times;
        self
    }

    pub fn forbidden(mut self, times: Vec<UintRange>) -> Self {
        self.permission.permanently_forbidden_times = times;
        self
    }

    pub fn build(self) -> CollectionApprovalPermission {
        self.permission
    }
}

/// Timeline permission over `timeline_times`.
pub fn timed_permission(
    timeline_times: Vec<UintRange>,
    permitted: Vec<UintRange>,
    forbidden: Vec<UintRange>,
) -> TimedUpdatePermission {
    TimedUpdatePermission {
        timeline_times,
        permanently_permitted_times: permitted,
        permanently_forbidden_times: forbidden,
    }
}

/// Badge metadata permission over `timeline_times` × `badge_ids`.
pub fn badge_permission(
    timeline_times: Vec<UintRange>,
    badge_ids: Vec<UintRange>,
    permitted: Vec<UintRange>,
    forbidden: Vec<UintRange>,
) -> TimedUpdateWithBadgeIdsPermission {
    TimedUpdateWithBadgeIdsPermission {
        timeline_times,
        badge_ids,
        permanently_permitted_times: permitted,
        permanently_forbidden_times: forbidden,
    }
}

/// Timeline from `(start, end, value)` triples.
pub fn timeline<V: Clone>(items: &[(u64, u64, V)]) -> Vec<TimelineItem<V>> {
    items
        .iter()
        .map(|(start, end, value)| TimelineItem::new(vec![range(*start, *end)], value.clone()))
        .collect()
}
