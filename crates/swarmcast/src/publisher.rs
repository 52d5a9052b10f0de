//! Feed publishing: manifest upload, update chunk, signed single-owner chunk.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;
use swarmchunk::{feed, Address, ContentChunk, Identifier, SingleOwnerChunk, Signer, SwarmAddress, Topic};
use tracing::{debug, info};

use crate::bee::StorageApi;
use crate::error::Result;

/// What one successful publish produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedUpdate {
    pub index: u64,
    #[serde(serialize_with = "serialize_identifier")]
    pub identifier: Identifier,
    pub manifest: SwarmAddress,
    pub soc_address: SwarmAddress,
    /// What the node answered for the single-owner chunk upload.
    pub reference: SwarmAddress,
}

fn serialize_identifier<S: serde::Serializer>(id: &Identifier, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&id.to_hex())
}

/// Publishes manifests as updates of one `(owner, topic)` feed.
///
/// The publisher does not track the index. Callers pass the index to write
/// and advance their own counter only when this returns `Ok`, so a failed
/// attempt is retried under the same identifier.
pub struct FeedPublisher {
    storage: Arc<dyn StorageApi>,
    signer: Arc<dyn Signer>,
    topic: Topic,
}

impl FeedPublisher {
    pub fn new(storage: Arc<dyn StorageApi>, signer: Arc<dyn Signer>, topic: Topic) -> Self {
        Self {
            storage,
            signer,
            topic,
        }
    }

    pub fn owner(&self) -> Address {
        self.signer.address()
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub async fn publish(&self, index: u64, manifest: Bytes) -> Result<PublishedUpdate> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.publish_at(index, manifest, now).await
    }

    /// Publish with an explicit update timestamp (unix seconds).
    #[tracing::instrument(skip(self, manifest), fields(bytes = manifest.len()))]
    pub async fn publish_at(&self, index: u64, manifest: Bytes, timestamp: u64) -> Result<PublishedUpdate> {
        let manifest_address = self.storage.upload_bytes(manifest).await?;
        debug!(%manifest_address, "manifest uploaded");

        let chunk = ContentChunk::new(feed::update_payload(timestamp, &manifest_address))?;
        let identifier = feed::identifier(&self.topic, index);
        let soc = SingleOwnerChunk::sign(identifier, chunk, self.signer.as_ref())?;

        let reference = self.storage.upload_soc(&soc).await?;
        info!(index, %identifier, %reference, "feed updated");

        Ok(PublishedUpdate {
            index,
            identifier,
            manifest: manifest_address,
            soc_address: soc.address(),
            reference,
        })
    }
}
