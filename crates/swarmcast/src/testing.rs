//! Test doubles: an in-memory [`StorageApi`] and a [`Signer`] that can be
//! switched off.
//!
//! [`MemoryStorage`] records every upload, answers with `keccak256(data)` as
//! the reference and can be told to fail any of the three calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use swarmchunk::{
    keccak256, Address, ChunkError, LocalSigner, Signature, Signer, SingleOwnerChunk, SwarmAddress,
    Topic, B256,
};

use crate::bee::StorageApi;
use crate::error::BeeError;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    uploads: Mutex<Vec<Bytes>>,
    socs: Mutex<Vec<SingleOwnerChunk>>,
    feed_index: Mutex<Option<u64>>,
    fail_uploads: AtomicBool,
    fail_socs: AtomicBool,
    fail_lookup: AtomicBool,
}

fn injected(what: &str) -> BeeError {
    BeeError::Status {
        url: format!("memory://{}", what),
        status: 500,
        body: "injected failure".to_string(),
    }
}

impl MemoryStorage {
    /// Storage whose feed already has `index` as its latest update.
    pub fn with_feed_index(index: u64) -> Self {
        let storage = Self::default();
        storage.set_feed_index(Some(index));
        storage
    }

    pub fn address_of(data: &[u8]) -> SwarmAddress {
        keccak256(data).into()
    }

    pub fn set_feed_index(&self, index: Option<u64>) {
        *self.feed_index.lock().unwrap_or_else(|p| p.into_inner()) = index;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_socs(&self, fail: bool) {
        self.fail_socs.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn uploaded(&self) -> Vec<Bytes> {
        self.uploads.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn socs(&self) -> Vec<SingleOwnerChunk> {
        self.socs.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl StorageApi for MemoryStorage {
    async fn upload_bytes(&self, data: Bytes) -> Result<SwarmAddress, BeeError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(injected("bytes"));
        }
        let address = Self::address_of(&data);
        self.uploads.lock().unwrap_or_else(|p| p.into_inner()).push(data);
        Ok(address)
    }

    async fn feed_index(&self, _owner: &Address, _topic: &Topic) -> Result<Option<u64>, BeeError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(injected("feeds"));
        }
        Ok(*self.feed_index.lock().unwrap_or_else(|p| p.into_inner()))
    }

    async fn upload_soc(&self, soc: &SingleOwnerChunk) -> Result<SwarmAddress, BeeError> {
        if self.fail_socs.load(Ordering::SeqCst) {
            return Err(injected("soc"));
        }
        self.socs.lock().unwrap_or_else(|p| p.into_inner()).push(soc.clone());
        Ok(soc.address())
    }
}

/// Wraps a [`LocalSigner`] and refuses to sign while switched to failing.
pub struct FailingSigner {
    inner: LocalSigner,
    failing: AtomicBool,
}

impl FailingSigner {
    /// Starts out failing.
    pub fn new(inner: LocalSigner) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(true),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

impl Signer for FailingSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_digest(&self, digest: &B256) -> swarmchunk::Result<Signature> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChunkError::Signing("signing key unavailable".to_string()));
        }
        self.inner.sign_digest(digest)
    }
}
