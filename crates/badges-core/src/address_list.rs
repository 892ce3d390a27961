//! Address lists with whitelist/blacklist polarity
//!
//! A whitelist contains exactly its addresses; a blacklist contains every
//! address except its addresses. Reserved list ids resolve to well-known
//! lists without any lookup.

use crate::errors::{BadgesError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Pseudo-address that badges are minted from.
pub const MINT_ADDRESS: &str = "Mint";

/// Reserved id: only the mint address
pub const MINT_LIST_ID: &str = "Mint";
/// Reserved id: every address, mint included
pub const ALL_LIST_ID: &str = "All";
/// Reserved id: every address, mint included
pub const ALL_WITH_MINT_LIST_ID: &str = "AllWithMint";
/// Reserved id: every address except the mint address
pub const ALL_WITHOUT_MINT_LIST_ID: &str = "AllWithoutMint";
/// Reserved id: no address
pub const NONE_LIST_ID: &str = "None";

const ALL_WITHOUT_PREFIX: &str = "AllWithout";
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Every address, mint included.
pub static ALL_WITH_MINT: Lazy<AddressList> =
    Lazy::new(|| AddressList::blacklist(Vec::<String>::new()).with_id(ALL_WITH_MINT_LIST_ID));

/// Every address except the mint address.
pub static ALL_WITHOUT_MINT: Lazy<AddressList> =
    Lazy::new(|| AddressList::blacklist([MINT_ADDRESS]).with_id(ALL_WITHOUT_MINT_LIST_ID));

/// Only the mint address.
pub static MINT_ONLY: Lazy<AddressList> =
    Lazy::new(|| AddressList::whitelist([MINT_ADDRESS]).with_id(MINT_LIST_ID));

/// No address at all.
pub static NO_ADDRESSES: Lazy<AddressList> =
    Lazy::new(|| AddressList::whitelist(Vec::<String>::new()).with_id(NONE_LIST_ID));

/// Named address set with whitelist/blacklist polarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressList {
    /// Identifier the list is referenced by
    #[serde(default)]
    pub list_id: String,
    /// Included (whitelist) or excluded (blacklist) addresses
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Polarity of `addresses`
    pub whitelist: bool,
    /// Off-chain metadata location
    #[serde(default)]
    pub uri: String,
    /// Arbitrary data attached by the creator
    #[serde(default)]
    pub custom_data: String,
    /// Creator of the list
    #[serde(default)]
    pub created_by: String,
}

impl AddressList {
    /// List containing exactly `addresses`.
    pub fn whitelist<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            whitelist: true,
            ..Self::default()
        }
    }

    /// List containing everything except `addresses`.
    pub fn blacklist<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            whitelist: false,
            ..Self::default()
        }
    }

    /// Set the list id.
    pub fn with_id(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = list_id.into();
        self
    }

    /// Membership test honoring polarity.
    pub fn contains(&self, address: &str) -> bool {
        let listed = self.addresses.iter().any(|a| a == address);
        listed == self.whitelist
    }

    /// True if no address is a member.
    pub fn is_empty(&self) -> bool {
        self.whitelist && self.addresses.is_empty()
    }

    /// True if every address is a member.
    pub fn is_universal(&self) -> bool {
        !self.whitelist && self.addresses.is_empty()
    }

    /// Same addresses, opposite polarity.
    pub fn inverted(&self) -> Self {
        Self {
            whitelist: !self.whitelist,
            ..self.clone()
        }
    }

    /// Short human readable form used in denial messages.
    pub fn describe(&self) -> String {
        if !self.list_id.is_empty() {
            return self.list_id.clone();
        }
        match (self.whitelist, self.addresses.is_empty()) {
            (true, true) => NONE_LIST_ID.to_string(),
            (false, true) => ALL_WITH_MINT_LIST_ID.to_string(),
            (true, false) => self.addresses.join(":"),
            (false, false) => format!("{ALL_WITHOUT_PREFIX}{}", self.addresses.join(":")),
        }
    }
}

/// Heuristic address syntax check (mint, 0x-hex or bech32).
pub fn is_address_like(candidate: &str) -> bool {
    if candidate == MINT_ADDRESS {
        return true;
    }
    if let Some(hex) = candidate.strip_prefix("0x") {
        return hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    let Some((hrp, data)) = candidate.rsplit_once('1') else {
        return false;
    };
    !hrp.is_empty()
        && hrp.bytes().all(|b| b.is_ascii_lowercase())
        && data.len() >= 6
        && data.chars().all(|c| BECH32_CHARSET.contains(c))
}

/// Resolve a reserved list id; `None` if the id is not reserved.
pub fn reserved_address_list(list_id: &str) -> Option<AddressList> {
    if let Some(inner) = list_id.strip_prefix('!') {
        let inner = inner
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(inner);
        return reserved_address_list(inner).map(|list| list.inverted().with_id(list_id));
    }

    let list = match list_id {
        MINT_LIST_ID => MINT_ONLY.clone(),
        ALL_LIST_ID | ALL_WITH_MINT_LIST_ID => ALL_WITH_MINT.clone().with_id(list_id),
        ALL_WITHOUT_MINT_LIST_ID => ALL_WITHOUT_MINT.clone(),
        NONE_LIST_ID => NO_ADDRESSES.clone(),
        _ => {
            if let Some(rest) = list_id.strip_prefix(ALL_WITHOUT_PREFIX) {
                AddressList::blacklist(split_addresses(rest)?)
            } else {
                AddressList::whitelist(split_addresses(list_id)?)
            }
        }
    };
    Some(list.with_id(list_id))
}

fn split_addresses(joined: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = joined.split(':').collect();
    parts
        .iter()
        .all(|part| is_address_like(part))
        .then(|| parts.into_iter().map(str::to_string).collect())
}

/// Universal list when the dimension is unused, the list itself otherwise.
pub fn list_with_options(list: &AddressList, uses: bool) -> AddressList {
    if uses {
        list.clone()
    } else {
        ALL_WITH_MINT.clone()
    }
}

/// Subtract `to_remove` from `from`.
///
/// Returns `(remaining, removed)` where `removed` is the intersection. Two
/// blacklists always intersect; a whitelist and a blacklist intersect unless
/// the whitelist lies inside the blacklist's exclusions.
pub fn remove_address_list(to_remove: &AddressList, from: &AddressList) -> (AddressList, AddressList) {
    let removing: BTreeSet<&str> = to_remove.addresses.iter().map(String::as_str).collect();
    let keeping: BTreeSet<&str> = from.addresses.iter().map(String::as_str).collect();

    let (from_in_removing, from_not_in_removing): (Vec<String>, Vec<String>) = from
        .addresses
        .iter()
        .cloned()
        .partition(|a| removing.contains(a.as_str()));
    let removing_not_in_from: Vec<String> = to_remove
        .addresses
        .iter()
        .filter(|a| !keeping.contains(a.as_str()))
        .cloned()
        .collect();
    let union = || {
        from.addresses
            .iter()
            .chain(removing_not_in_from.iter())
            .cloned()
            .collect::<Vec<String>>()
    };

    trace!(
        from = %from.describe(),
        removing = %to_remove.describe(),
        "splitting address lists"
    );
    match (from.whitelist, to_remove.whitelist) {
        (true, true) => (
            AddressList::whitelist(from_not_in_removing),
            AddressList::whitelist(from_in_removing),
        ),
        (true, false) => (
            AddressList::whitelist(from_in_removing),
            AddressList::whitelist(from_not_in_removing),
        ),
        (false, true) => (
            AddressList::blacklist(union()),
            AddressList::whitelist(removing_not_in_from),
        ),
        (false, false) => (
            AddressList::whitelist(removing_not_in_from.clone()),
            AddressList::blacklist(union()),
        ),
    }
}

/// Looks up address lists by id.
pub trait AddressListResolver {
    /// Resolve `list_id`, failing with `NotFound` for unknown ids.
    fn resolve(&self, list_id: &str) -> Result<AddressList>;
}

impl<T: AddressListResolver + ?Sized> AddressListResolver for &T {
    fn resolve(&self, list_id: &str) -> Result<AddressList> {
        (**self).resolve(list_id)
    }
}

/// Resolver that only knows reserved ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservedLists;

impl AddressListResolver for ReservedLists {
    fn resolve(&self, list_id: &str) -> Result<AddressList> {
        reserved_address_list(list_id)
            .ok_or_else(|| BadgesError::not_found(format!("address list {list_id:?}")))
    }
}

/// Resolver over lists already fetched by the caller, with reserved fallback.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLists {
    lists: BTreeMap<String, AddressList>,
}

impl InMemoryLists {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a list; reserved ids cannot be shadowed.
    pub fn insert(&mut self, list: AddressList) -> Result<()> {
        if list.list_id.is_empty() {
            return Err(BadgesError::invalid("address list id is empty"));
        }
        if reserved_address_list(&list.list_id).is_some() || list.list_id.starts_with('!') {
            return Err(BadgesError::invalid(format!(
                "address list id {:?} is reserved",
                list.list_id
            )));
        }
        self.lists.insert(list.list_id.clone(), list);
        Ok(())
    }

    /// Store several lists.
    pub fn from_lists(lists: impl IntoIterator<Item = AddressList>) -> Result<Self> {
        let mut store = Self::new();
        for list in lists {
            store.insert(list)?;
        }
        Ok(store)
    }
}

impl AddressListResolver for InMemoryLists {
    fn resolve(&self, list_id: &str) -> Result<AddressList> {
        if let Some(list) = reserved_address_list(list_id) {
            return Ok(list);
        }
        if let Some(list) = self.lists.get(list_id) {
            return Ok(list.clone());
        }
        if let Some(inner) = list_id.strip_prefix('!') {
            let inner = inner
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .unwrap_or(inner);
            if let Some(list) = self.lists.get(inner) {
                return Ok(list.inverted().with_id(list_id));
            }
        }
        debug!(list_id, known = self.lists.len(), "address list not found");
        Err(BadgesError::not_found(format!("address list {list_id:?}")))
    }
}
