//! Timeline-valued collection fields

use badges_core::{TimelineItem, UintRange};
use serde::{Deserialize, Serialize};

/// Off-chain metadata pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub uri: String,
    pub custom_data: String,
}

impl Metadata {
    pub fn new(uri: impl Into<String>, custom_data: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            custom_data: custom_data.into(),
        }
    }
}

/// Metadata for a set of badge ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BadgeMetadata {
    pub uri: String,
    pub custom_data: String,
    pub badge_ids: Vec<UintRange>,
}

impl BadgeMetadata {
    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.uri.clone(), self.custom_data.clone())
    }
}

/// Scalar value carried by a flattened timeline region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Texts(Vec<String>),
    Metadata(Metadata),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Texts(value)
    }
}

impl From<Metadata> for FieldValue {
    fn from(value: Metadata) -> Self {
        Self::Metadata(value)
    }
}

pub type ManagerTimeline = TimelineItem<String>;
pub type CollectionMetadataTimeline = TimelineItem<Metadata>;
pub type OffChainBalancesMetadataTimeline = TimelineItem<Metadata>;
pub type BadgeMetadataTimeline = TimelineItem<Vec<BadgeMetadata>>;
pub type StandardsTimeline = TimelineItem<Vec<String>>;
pub type CustomDataTimeline = TimelineItem<String>;
pub type IsArchivedTimeline = TimelineItem<bool>;
