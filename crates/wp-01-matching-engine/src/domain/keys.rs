//! # Correlation Keys
//!
//! Composite `(chain, token)` keys with a defined ordering, so per-chain
//! range scans work against any sorted store backend.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, MessageToken};
use std::fmt;
use wp_02_keyed_store::KeyRange;

/// Separator between the chain and token halves of a rendered key.
const SEPARATOR: char = ':';

/// Upper range sentinel: the character immediately after the separator in
/// ASCII, so `"<chain>:"` .. `"<chain>;"` brackets every key of a chain.
const RANGE_END: char = ';';

/// A composite store key identifying one correlated message on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationKey {
    /// Chain half of the key.
    pub chain_id: ChainId,
    /// Hash or topic-id half of the key.
    pub token: MessageToken,
}

impl CorrelationKey {
    /// Create a key from a chain and a token.
    pub fn new(chain_id: impl Into<ChainId>, token: impl Into<MessageToken>) -> Self {
        Self {
            chain_id: chain_id.into(),
            token: token.into(),
        }
    }

    /// Rendered storage key, `<chain>:<token>`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}{}{}", self.chain_id, SEPARATOR, self.token)
    }

    /// Exclusive range bounds covering every key of one chain.
    #[must_use]
    pub fn chain_range(chain_id: &ChainId) -> KeyRange {
        KeyRange::between(
            format!("{chain_id}{SEPARATOR}"),
            format!("{chain_id}{RANGE_END}"),
        )
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.chain_id, SEPARATOR, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_concatenates_chain_and_token() {
        let key = CorrelationKey::new("2004", "0xdeadbeef");
        assert_eq!(key.storage_key(), "2004:0xdeadbeef");
    }

    #[test]
    fn chain_range_brackets_only_that_chain() {
        let range = CorrelationKey::chain_range(&ChainId::from("1000"));
        assert!(range.contains("1000:0x00"));
        assert!(range.contains("1000:0xff"));
        assert!(!range.contains("1000:"));
        assert!(!range.contains("10000:0xaa"), "longer chain id is outside");
        assert!(!range.contains("2004:0xaa"));
    }

    #[test]
    fn ordering_groups_by_chain() {
        let a = CorrelationKey::new("1000", "0xff");
        let b = CorrelationKey::new("2004", "0x00");
        assert!(a < b);
        assert!(a.storage_key() < b.storage_key());
    }
}
