//! Single-owner chunks: a content chunk bound to `(identifier, owner)`.
//!
//! Layout on the wire: `id (32) || signature (65) || span (8) || payload`.
//! The address is `keccak256(id || owner)`, so an owner can keep writing new
//! content under addresses that readers compute in advance.

use alloy_primitives::{keccak256, Address, Signature, B256};

use crate::address::SwarmAddress;
use crate::cac::ContentChunk;
use crate::error::{ChunkError, Result};
use crate::feed::{Identifier, IDENTIFIER_SIZE};
use crate::signer::Signer;

pub const SIGNATURE_SIZE: usize = 65;

#[derive(Debug, Clone)]
pub struct SingleOwnerChunk {
    id: Identifier,
    owner: Address,
    signature: Signature,
    chunk: ContentChunk,
}

impl SingleOwnerChunk {
    /// Bind `chunk` to `id` and sign it with `signer`.
    pub fn sign<S: Signer + ?Sized>(id: Identifier, chunk: ContentChunk, signer: &S) -> Result<Self> {
        let digest = Self::digest(&id, &chunk.address());
        let signature = signer.sign_digest(&digest)?;
        Ok(Self {
            id,
            owner: signer.address(),
            signature,
            chunk,
        })
    }

    /// The digest the owner signs: `keccak256(id || content address)`.
    pub fn digest(id: &Identifier, content: &SwarmAddress) -> B256 {
        let mut buf = [0u8; IDENTIFIER_SIZE + 32];
        buf[..IDENTIFIER_SIZE].copy_from_slice(id.as_bytes());
        buf[IDENTIFIER_SIZE..].copy_from_slice(content.as_bytes());
        keccak256(buf)
    }

    pub fn address(&self) -> SwarmAddress {
        let mut buf = [0u8; IDENTIFIER_SIZE + 20];
        buf[..IDENTIFIER_SIZE].copy_from_slice(self.id.as_bytes());
        buf[IDENTIFIER_SIZE..].copy_from_slice(self.owner.as_slice());
        keccak256(buf).into()
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn chunk(&self) -> &ContentChunk {
        &self.chunk
    }

    /// Signature as `r || s || v` with `v` in {27, 28}.
    pub fn signature_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        self.signature.as_bytes()
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature_bytes())
    }

    pub fn data(&self) -> Vec<u8> {
        let chunk_data = self.chunk.data();
        let mut data = Vec::with_capacity(IDENTIFIER_SIZE + SIGNATURE_SIZE + chunk_data.len());
        data.extend_from_slice(self.id.as_bytes());
        data.extend_from_slice(&self.signature_bytes());
        data.extend_from_slice(&chunk_data);
        data
    }

    /// Recover the address that produced the signature.
    pub fn recover_owner(&self) -> Result<Address> {
        let digest = Self::digest(&self.id, &self.chunk.address());
        self.signature
            .recover_address_from_msg(digest.as_slice())
            .map_err(|e| ChunkError::Recovery(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmt::SPAN_SIZE;
    use crate::feed::{identifier, update_payload, Topic};
    use crate::signer::LocalSigner;

    fn signer() -> LocalSigner {
        LocalSigner::from_hex(&"11".repeat(32)).unwrap()
    }

    fn sample_soc() -> SingleOwnerChunk {
        let id = identifier(&Topic::from_name("test radio"), 3);
        let chunk = ContentChunk::new(update_payload(1_700_000_000, &SwarmAddress::new([7; 32]))).unwrap();
        SingleOwnerChunk::sign(id, chunk, &signer()).unwrap()
    }

    #[test]
    fn test_owner_is_signer_and_recoverable() {
        let soc = sample_soc();
        assert_eq!(soc.owner(), signer().address());
        assert_eq!(soc.recover_owner().unwrap(), signer().address());
    }

    #[test]
    fn test_address_is_keccak_of_id_and_owner() {
        let soc = sample_soc();
        let mut expected = soc.id().as_bytes().to_vec();
        expected.extend_from_slice(soc.owner().as_slice());
        assert_eq!(soc.address(), SwarmAddress::from(keccak256(&expected)));
    }

    #[test]
    fn test_signature_shape() {
        let soc = sample_soc();
        let sig = soc.signature_bytes();
        assert!(sig[64] == 27 || sig[64] == 28);
        assert_eq!(soc.signature_hex().len(), 2 * SIGNATURE_SIZE);
    }

    #[test]
    fn test_data_layout() {
        let soc = sample_soc();
        let data = soc.data();
        assert_eq!(data.len(), IDENTIFIER_SIZE + SIGNATURE_SIZE + SPAN_SIZE + 40);
        assert_eq!(&data[..IDENTIFIER_SIZE], soc.id().as_bytes());
        assert_eq!(
            &data[IDENTIFIER_SIZE..IDENTIFIER_SIZE + SIGNATURE_SIZE],
            &soc.signature_bytes()
        );
        assert_eq!(&data[IDENTIFIER_SIZE + SIGNATURE_SIZE..], soc.chunk().data().as_slice());
    }

    #[test]
    fn test_same_inputs_same_address_different_index_different_address() {
        let topic = Topic::from_name("test radio");
        let chunk = ContentChunk::new(b"x".to_vec()).unwrap();
        let a = SingleOwnerChunk::sign(identifier(&topic, 5), chunk.clone(), &signer()).unwrap();
        let b = SingleOwnerChunk::sign(identifier(&topic, 5), chunk.clone(), &signer()).unwrap();
        let c = SingleOwnerChunk::sign(identifier(&topic, 6), chunk, &signer()).unwrap();
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
    }
}
