//! Core identifier types used throughout the ledger
//!
//! Both identifiers are opaque newtypes so an account id can never be passed
//! where a transfer id is expected. The nil value of each plays the role of
//! "empty identifier" and is rejected at every service boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account ID - globally unique, immutable after assignment.
///
/// # Constraints:
/// - **Immutable**: assigned when the account is created, never changes
/// - **Nil = empty**: `AccountId::nil()` is never a valid holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(uuid::Uuid);

impl AccountId {
    /// Generate a fresh random account id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The empty identifier
    pub fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

/// Transfer ID - ULID-based unique identifier
///
/// ULIDs sort by creation time, which gives history queries a stable,
/// storage-assigned tiebreak when two transfers share a transfer date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// The empty identifier
    pub fn nil() -> Self {
        Self(ulid::Ulid::nil())
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for TransferId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransferId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_nil() {
        assert!(AccountId::nil().is_nil());
        assert!(!AccountId::new().is_nil());
    }

    #[test]
    fn test_account_id_parse() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_transfer_id_creation_order() {
        let first = TransferId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = TransferId::new();
        assert!(second > first);
    }

    #[test]
    fn test_transfer_id_serde() {
        let id = TransferId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TransferId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
