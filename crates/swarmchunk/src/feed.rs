//! Sequential feeds: topics, update identifiers and update payloads.
//!
//! Update `n` of a feed lives at the single-owner chunk whose identifier is
//! `keccak256(topic || be64(n))`. Anyone who knows the owner and topic can
//! compute where update `n` is without consulting a directory.

use alloy_primitives::keccak256;
use std::fmt;
use std::str::FromStr;

use crate::address::SwarmAddress;
use crate::error::{ChunkError, Result};

pub const TOPIC_SIZE: usize = 32;
pub const IDENTIFIER_SIZE: usize = 32;

/// Size of an update payload: 8-byte timestamp plus a reference.
pub const UPDATE_PAYLOAD_SIZE: usize = 8 + crate::address::SWARM_ADDRESS_SIZE;

/// A feed topic: the keccak-256 hash of an application-chosen name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic([u8; TOPIC_SIZE]);

impl Topic {
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()).0)
    }

    pub fn from_bytes(bytes: [u8; TOPIC_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TOPIC_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Topic {
    type Err = ChunkError;

    /// Parse a 32-byte topic from hex (not a name; use [`Topic::from_name`]).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let array: [u8; TOPIC_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ChunkError::InvalidLength {
                expected: TOPIC_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }
}

/// Identifier of a single feed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; IDENTIFIER_SIZE]);

impl Identifier {
    pub fn from_bytes(bytes: [u8; IDENTIFIER_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Derive the identifier of update `index` under `topic`.
pub fn identifier(topic: &Topic, index: u64) -> Identifier {
    let mut buf = [0u8; TOPIC_SIZE + 8];
    buf[..TOPIC_SIZE].copy_from_slice(topic.as_bytes());
    buf[TOPIC_SIZE..].copy_from_slice(&index.to_be_bytes());
    Identifier(keccak256(buf).0)
}

/// Build an update payload: `be64(timestamp) || reference`.
pub fn update_payload(timestamp: u64, reference: &SwarmAddress) -> Vec<u8> {
    let mut payload = Vec::with_capacity(UPDATE_PAYLOAD_SIZE);
    payload.extend_from_slice(&timestamp.to_be_bytes());
    payload.extend_from_slice(reference.as_bytes());
    payload
}

/// Decode a feed index as Bee reports it: hex of a big-endian u64.
pub fn parse_index(hex_index: &str) -> Result<u64> {
    let bytes = hex::decode(hex_index.trim())?;
    let array: [u8; 8] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ChunkError::InvalidLength {
            expected: 8,
            actual: bytes.len(),
        })?;
    Ok(u64::from_be_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_from_empty_name_is_keccak_of_empty() {
        assert_eq!(
            Topic::from_name("").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_topic_hex_roundtrip() {
        let topic = Topic::from_name("test radio");
        let parsed: Topic = topic.to_hex().parse().unwrap();
        assert_eq!(parsed, topic);
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let topic = Topic::from_name("test radio");
        assert_eq!(identifier(&topic, 7), identifier(&topic, 7));
        assert_eq!(
            identifier(&topic, 7),
            identifier(&Topic::from_name("test radio"), 7)
        );
    }

    #[test]
    fn test_identifier_varies_with_index_and_topic() {
        let topic = Topic::from_name("test radio");
        assert_ne!(identifier(&topic, 0), identifier(&topic, 1));
        assert_ne!(
            identifier(&topic, 0),
            identifier(&Topic::from_name("other radio"), 0)
        );
    }

    #[test]
    fn test_identifier_hashes_topic_then_big_endian_index() {
        let topic = Topic::from_bytes([0x11; 32]);
        let mut expected = vec![0x11; 32];
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 42]);
        assert_eq!(identifier(&topic, 42).as_bytes(), &keccak256(&expected).0);
    }

    #[test]
    fn test_update_payload_layout() {
        let reference = SwarmAddress::new([0xcd; 32]);
        let payload = update_payload(0x0102030405060708, &reference);
        assert_eq!(payload.len(), UPDATE_PAYLOAD_SIZE);
        assert_eq!(&payload[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&payload[8..], reference.as_bytes());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0000000000000029").unwrap(), 41);
        assert_eq!(parse_index("0000000000000000").unwrap(), 0);
        assert!(matches!(
            parse_index("29"),
            Err(ChunkError::InvalidLength { expected: 8, actual: 1 })
        ));
        assert!(matches!(parse_index("not hex!"), Err(ChunkError::InvalidHex(_))));
    }
}
