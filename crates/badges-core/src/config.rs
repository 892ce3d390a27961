//! Engine configuration
//!
//! Loaded from TOML or JSON (chosen by file extension), optionally overridden
//! from the environment:
//!
//! - `BADGES_EVALUATION_TIME`: pin the instant permission windows are
//!   evaluated at (unix millis)
//! - `BADGES_UNHANDLED_REGIONS`: `require_permitted` or `neutral`

use crate::errors::{BadgesError, Result};
use crate::time::current_unix_timestamp_millis;
use crate::uint::{Uint, MAX_UINT_64};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Environment variable pinning the evaluation time
pub const ENV_EVALUATION_TIME: &str = "BADGES_EVALUATION_TIME";
/// Environment variable selecting the unhandled-region policy
pub const ENV_UNHANDLED_REGIONS: &str = "BADGES_UNHANDLED_REGIONS";

/// What happens to a changed region no permission declaration speaks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledRegionPolicy {
    /// The region must be covered by permitted windows
    #[default]
    RequirePermitted,
    /// Only forbidden windows deny; silence allows
    Neutral,
}

impl FromStr for UnhandledRegionPolicy {
    type Err = BadgesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "require_permitted" => Ok(Self::RequirePermitted),
            "neutral" => Ok(Self::Neutral),
            other => Err(BadgesError::invalid(format!(
                "unknown unhandled region policy {other:?}"
            ))),
        }
    }
}

/// Settings shared by every validator call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Instant permission windows are evaluated at; `None` reads the clock
    pub evaluation_time: Option<Uint>,
    /// Treatment of changed regions without a matching permission
    pub unhandled_regions: UnhandledRegionPolicy,
}

impl EngineConfig {
    /// Configuration pinned to `time`.
    pub fn at_time(time: impl Into<Uint>) -> Self {
        Self {
            evaluation_time: Some(time.into()),
            ..Self::default()
        }
    }

    /// Replace the unhandled-region policy.
    pub fn with_unhandled_regions(mut self, policy: UnhandledRegionPolicy) -> Self {
        self.unhandled_regions = policy;
        self
    }

    /// The evaluation instant.
    pub fn now(&self) -> Uint {
        self.evaluation_time
            .clone()
            .unwrap_or_else(current_unix_timestamp_millis)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BadgesError::internal(format!("Failed to read config file: {e}")))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(BadgesError::invalid("Unsupported config file format")),
        };
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Parse TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `BADGES_*` variable names.
    pub fn merge_with_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(time) = lookup(ENV_EVALUATION_TIME) {
            self.evaluation_time = Some(time.parse().map_err(|_| {
                BadgesError::invalid(format!("Invalid time in {ENV_EVALUATION_TIME}: {time:?}"))
            })?);
        }
        if let Some(policy) = lookup(ENV_UNHANDLED_REGIONS) {
            self.unhandled_regions = policy.parse()?;
        }
        self.validate()
    }

    /// Check value bounds.
    pub fn validate(&self) -> Result<()> {
        match &self.evaluation_time {
            Some(time) if time.is_zero() || *time > *MAX_UINT_64 => Err(BadgesError::invalid(
                format!("evaluation time {time} is outside [1, {}]", *MAX_UINT_64),
            )),
            _ => Ok(()),
        }
    }
}
