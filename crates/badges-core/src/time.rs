//! Wall-clock access
//!
//! Timeline lookups and permission windows default to the current unix time in
//! milliseconds. Callers that need reproducible verdicts pin the time through
//! [`crate::config::EngineConfig::evaluation_time`].

use crate::uint::Uint;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix timestamp in milliseconds.
pub fn current_unix_timestamp_millis() -> Uint {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    Uint::from(millis)
}
