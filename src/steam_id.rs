use crate::errors::GiftError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lowest 64-bit id of an individual account in the public universe.
const INDIVIDUAL_BASE: u64 = 0x0110_0001_0000_0000;

/// Identifier of a Steam account.
///
/// The checkout endpoints want the 32-bit account number while the community
/// endpoints want the full 64-bit id, so both views are available. Only
/// individual accounts in the public universe are modelled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SteamId(u64);

impl SteamId {
    pub fn from_steam_id64(id: u64) -> Self {
        Self(id)
    }

    pub fn from_account_id(account_id: u32) -> Self {
        Self(INDIVIDUAL_BASE | account_id as u64)
    }

    /// Full 64-bit id as used by the community site.
    pub fn steam_id64(&self) -> u64 {
        self.0
    }

    /// 32-bit account number as used by the checkout.
    pub fn account_id(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

impl Display for SteamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = GiftError;

    /// Accepts a 64-bit id, a bare account number or the `[U:1:n]` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || GiftError::InvalidSteamId(s.to_string());

        if let Some(inner) = s.strip_prefix("[U:1:").and_then(|r| r.strip_suffix(']')) {
            let account_id = inner.parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::from_account_id(account_id));
        }

        let id = s.parse::<u64>().map_err(|_| invalid())?;
        if id <= u32::MAX as u64 {
            Ok(Self::from_account_id(id as u32))
        } else if id >> 32 == INDIVIDUAL_BASE >> 32 {
            Ok(Self(id))
        } else {
            Err(invalid())
        }
    }
}
