//! # Core Domain Entities
//!
//! Defines the identifiers and observation primitives shared by every
//! Waypoint subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `ChainId`, `MessageToken`, `AccountId`
//! - **Observation context**: `BlockRef`, `Outcome`
//! - **Payloads**: `HexPayload`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a chain (network) as reported by the decoding layer.
///
/// Opaque to the tracker: paraid-style numerics ("0", "2004") and URN-style
/// identifiers are both valid. Ordering is lexicographic, which is all the
/// correlation-key range scans require.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    /// Create a chain id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A correlation token: either a message hash or an explicit topic id,
/// hex-encoded by the decoder. Kept verbatim (including any `0x` prefix)
/// so the same observation always produces the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageToken(pub String);

impl MessageToken {
    /// Create a token from anything string-like.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Account identifier of the original sender, as formatted by the decoder
/// (SS58, hex public key, or an EVM address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an account id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of an observation within its chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Hash of the block the observation came from.
    pub hash: String,
    /// Height of that block.
    pub number: u64,
}

impl BlockRef {
    /// Create a block reference.
    pub fn new(hash: impl Into<String>, number: u64) -> Self {
        Self {
            hash: hash.into(),
            number,
        }
    }
}

/// Execution outcome of a message leg as reported by the observed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The leg executed successfully.
    Success,
    /// The leg failed on-chain.
    Fail,
}

impl Outcome {
    /// Whether this outcome represents on-chain success.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Direction of a hop notification relative to the intermediate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HopDirection {
    /// The intermediate chain re-sent the message onward.
    Out,
    /// The intermediate chain received the message.
    In,
}

impl fmt::Display for HopDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopDirection::Out => f.write_str("out"),
            HopDirection::In => f.write_str("in"),
        }
    }
}

/// Stage of a cross-consensus bridge crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStage {
    /// The exporting bridge hub accepted the message.
    Accepted,
    /// Delivery to the peer consensus was confirmed at the exporting hub.
    Delivered,
    /// The importing bridge hub received the message.
    Received,
}

impl fmt::Display for BridgeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeStage::Accepted => f.write_str("accepted"),
            BridgeStage::Delivered => f.write_str("delivered"),
            BridgeStage::Received => f.write_str("received"),
        }
    }
}

/// Raw message payload bytes.
///
/// Serialized as a hex string (a leading `0x` is accepted on input and
/// emitted on output) so NDJSON observations stay human-inspectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexPayload(pub Vec<u8>);

impl HexPayload {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex string, tolerating a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, crate::errors::DecodeError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(stripped)
            .map(Self)
            .map_err(|e| crate::errors::DecodeError::InvalidHex {
                reason: e.to_string(),
            })
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length of the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HexPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for HexPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HexPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexPayload::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_orders_lexicographically() {
        assert!(ChainId::from("1000") < ChainId::from("2004"));
        assert!(ChainId::from("0") < ChainId::from("1000"));
    }

    #[test]
    fn hex_payload_accepts_prefixed_and_bare_hex() {
        let prefixed = HexPayload::from_hex("0x0310").unwrap();
        let bare = HexPayload::from_hex("0310").unwrap();
        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.as_bytes(), &[0x03, 0x10]);
    }

    #[test]
    fn hex_payload_rejects_garbage() {
        assert!(HexPayload::from_hex("0xzz").is_err());
    }

    #[test]
    fn hex_payload_round_trips_through_json() {
        let payload = HexPayload::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, "\"0xdeadbeef\"");
        let back: HexPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&Outcome::Fail).unwrap(), "\"fail\"");
    }
}
