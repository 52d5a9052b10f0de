//! SwarmAddress: a 32-byte chunk address, rendered as 64 lowercase hex chars.
//!
//! The all-zero address doubles as the "unresolved" value handed out by
//! lookups that miss, mirroring how a Bee node renders an empty reference.

use alloy_primitives::B256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChunkError, Result};

/// Size of a Swarm address in bytes.
pub const SWARM_ADDRESS_SIZE: usize = 32;

/// A Swarm chunk address (content hash or single-owner chunk address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SwarmAddress([u8; SWARM_ADDRESS_SIZE]);

impl SwarmAddress {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; SWARM_ADDRESS_SIZE]);

    pub const fn new(bytes: [u8; SWARM_ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SWARM_ADDRESS_SIZE] =
            bytes.try_into().map_err(|_| ChunkError::InvalidLength {
                expected: SWARM_ADDRESS_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_str_checked(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SWARM_ADDRESS_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; SWARM_ADDRESS_SIZE]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<B256> for SwarmAddress {
    fn from(hash: B256) -> Self {
        Self(hash.0)
    }
}

impl From<SwarmAddress> for B256 {
    fn from(address: SwarmAddress) -> Self {
        B256::new(address.0)
    }
}

impl AsRef<[u8]> for SwarmAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for SwarmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for SwarmAddress {
    type Err = ChunkError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}

// Bee speaks addresses as bare hex strings in JSON.
impl Serialize for SwarmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SwarmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
