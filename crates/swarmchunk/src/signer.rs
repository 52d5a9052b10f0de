//! Signing capability for single-owner chunks.

use alloy_primitives::{Address, Signature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::fmt;

use crate::error::{ChunkError, Result};

/// Something that owns an Ethereum address and can sign 32-byte digests.
///
/// Digests are signed as EIP-191 personal messages, which is what Bee
/// verifies single-owner chunk signatures against.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    fn sign_digest(&self, digest: &B256) -> Result<Signature>;
}

/// A secp256k1 key held in process memory.
#[derive(Clone)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Decode a hex private key, with or without a `0x` prefix.
    pub fn from_hex(key: &str) -> Result<Self> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let bytes = hex::decode(key)?;
        if bytes.len() != 32 {
            return Err(ChunkError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let inner =
            PrivateKeySigner::from_slice(&bytes).map_err(|e| ChunkError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_digest(&self, digest: &B256) -> Result<Signature> {
        self.inner
            .sign_message_sync(digest.as_slice())
            .map_err(|e| ChunkError::Signing(e.to_string()))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.inner.address())
            .finish_non_exhaustive()
    }
}
