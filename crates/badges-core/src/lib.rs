//! Badges Core - value algebra for badge permission resolution
//!
//! Leaf layer of the permission engine. Everything here is pure data and pure
//! functions over it:
//!
//! - `Uint` and the `MAX_UINT_64` sentinel shared with the chain
//! - `UintRange` interval algebra (normalize, search, subtract, invert)
//! - `AddressList` polarity semantics and reserved list ids
//! - `TimelineItem` lookup and gap filling
//! - `EngineConfig` and the unified `BadgesError`

#![forbid(unsafe_code)]

/// Address lists, reserved ids and list resolution
pub mod address_list;

/// Engine configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// Inclusive interval algebra
pub mod ranges;

/// Wall-clock access
pub mod time;

/// Timeline lookup and gap filling
pub mod timeline;

/// Checked unsigned integers
pub mod uint;

pub use address_list::{
    list_with_options, remove_address_list, reserved_address_list, AddressList,
    AddressListResolver, InMemoryLists, ReservedLists, ALL_WITH_MINT, MINT_ADDRESS,
};
pub use config::{EngineConfig, UnhandledRegionPolicy};
pub use errors::{BadgesError, Result};
pub use ranges::UintRange;
pub use timeline::{full_timeline, index_at_time, value_at_time, TimelineItem};
pub use uint::{Uint, MAX_UINT_64};
