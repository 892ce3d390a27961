//! Badges Testing Infrastructure
//!
//! Shared fixtures for the permission engine's integration tests: builders
//! for approvals and permissions, JSON fixture loading, proptest strategies
//! and a tracing subscriber for test output.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]
//!
//! # Usage
//!
//! ```rust,no_run
//! use badges_testkit::*;
//!
//! init_test_tracing();
//! let approval = ApprovalBuilder::new("mint").from("Mint").badge_ids(vec![range(1, 10)]).build();
//! ```

pub mod builders;
pub mod fixtures;
pub mod strategies;

pub use builders::*;
pub use fixtures::*;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
