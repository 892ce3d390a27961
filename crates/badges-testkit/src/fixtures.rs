//! JSON fixtures in the REST document shape

use serde::de::DeserializeOwned;

/// A mint approval as returned by the indexer: string-encoded numbers,
/// camelCase fields and partially filled criteria.
pub const MINT_APPROVALS_JSON: &str = r#"[
  {
    "fromListId": "Mint",
    "toListId": "AllWithMint",
    "initiatedByListId": "AllWithMint",
    "transferTimes": [{"start": "1", "end": "18446744073709551615"}],
    "badgeIds": [{"start": "1", "end": "10"}],
    "ownershipTimes": [{"start": "1", "end": "18446744073709551615"}],
    "approvalId": "mint",
    "uri": "ipfs://approval",
    "approvalCriteria": {
      "approvalAmounts": {"overallApprovalAmount": "100", "amountTrackerId": "mint"},
      "overrideFromOutgoingApprovals": true
    }
  }
]"#;

/// Collection permissions locking the first ten badges' approvals.
pub const LOCKED_PERMISSIONS_JSON: &str = r#"{
  "canUpdateCollectionApprovals": [
    {
      "fromListId": "AllWithMint",
      "toListId": "AllWithMint",
      "initiatedByListId": "AllWithMint",
      "transferTimes": [{"start": 1, "end": "18446744073709551615"}],
      "badgeIds": [{"start": 1, "end": 10}],
      "ownershipTimes": [{"start": 1, "end": "18446744073709551615"}],
      "approvalId": "All",
      "permanentlyPermittedTimes": [],
      "permanentlyForbiddenTimes": [{"start": 1, "end": "18446744073709551615"}]
    }
  ],
  "canUpdateManager": [
    {
      "timelineTimes": [{"start": 1, "end": "18446744073709551615"}],
      "permanentlyPermittedTimes": [{"start": 1, "end": "18446744073709551615"}]
    }
  ]
}"#;

/// Parse a fixture; panics with the serde error on mismatch.
pub fn from_json<T: DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).expect("fixture matches type")
}
