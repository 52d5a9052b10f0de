//! The relay actor.
//!
//! # Architecture
//!
//! - HTTP handlers turn each request into an [`Ingress`] and send it over a
//!   bounded mpsc queue
//! - One task owns the [`FeedPublisher`] and is the only thing that advances
//!   the [`FeedCounter`], so requests are handled strictly one at a time in
//!   arrival order
//! - Each caller gets its result back on a oneshot channel
//! - The segment cache is maintained after every request, success or not
//!
//! A request whose caller has gone away is still processed once queued;
//! only the reply is lost.

use std::sync::Arc;

use bytes::Bytes;
use swarmchunk::SwarmAddress;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bee::StorageApi;
use crate::error::{RelayError, Result};
use crate::feed_index::FeedCounter;
use crate::manifest::Rewriter;
use crate::publisher::{FeedPublisher, PublishedUpdate};
use crate::segments::SegmentCache;

pub const DEFAULT_PLAYLIST_MARKER: &str = ".m3u8";

/// One unit of work for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingress {
    /// A media segment, cached under `name` once uploaded.
    Segment { name: String, body: Bytes },
    /// A playlist to rewrite and publish.
    Manifest { name: String, body: Bytes },
}

impl Ingress {
    /// Classify a request by the last component of its path.
    pub fn classify(path: &str, body: Bytes, playlist_marker: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        if name.contains(playlist_marker) {
            Ingress::Manifest { name, body }
        } else {
            Ingress::Segment { name, body }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Ingress::Segment { name, .. } | Ingress::Manifest { name, .. } => name,
        }
    }
}

/// What handling an [`Ingress`] achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cached { name: String, address: SwarmAddress },
    Published(PublishedUpdate),
}

struct Job {
    ingress: Ingress,
    reply: oneshot::Sender<Result<Outcome>>,
}

/// State owned by the relay task.
pub struct Relay {
    storage: Arc<dyn StorageApi>,
    publisher: FeedPublisher,
    rewriter: Rewriter,
    cache: Arc<SegmentCache>,
    counter: Arc<FeedCounter>,
}

impl Relay {
    pub fn new(
        storage: Arc<dyn StorageApi>,
        publisher: FeedPublisher,
        rewriter: Rewriter,
        cache: Arc<SegmentCache>,
        counter: Arc<FeedCounter>,
    ) -> Self {
        Self {
            storage,
            publisher,
            rewriter,
            cache,
            counter,
        }
    }

    /// Handle one request, then run cache maintenance.
    pub async fn handle(&self, ingress: Ingress) -> Result<Outcome> {
        let result = match ingress {
            Ingress::Segment { name, body } => self.ingest_segment(name, body).await,
            Ingress::Manifest { name, body } => self.ingest_manifest(&name, body).await,
        };

        let evicted = self.cache.maintain();
        if evicted > 0 {
            debug!(evicted, remaining = self.cache.len(), "segment cache maintained");
        }

        result
    }

    async fn ingest_segment(&self, name: String, body: Bytes) -> Result<Outcome> {
        let address = self.storage.upload_bytes(body).await?;
        self.cache.store(name.clone(), address);
        info!(segment = %name, %address, "uploaded segment");
        Ok(Outcome::Cached { name, address })
    }

    async fn ingest_manifest(&self, name: &str, body: Bytes) -> Result<Outcome> {
        let text = std::str::from_utf8(&body)?;
        let rewritten = self.rewriter.rewrite(text, &self.cache);
        if rewritten.stats.unresolved > 0 {
            warn!(
                manifest = %name,
                unresolved = rewritten.stats.unresolved,
                segments = rewritten.stats.segments,
                "playlist references segments we have not uploaded"
            );
        }
        debug!(manifest = %name, text = %rewritten.text, "rewrote playlist");

        let index = self.counter.current();
        let update = self
            .publisher
            .publish(index, Bytes::from(rewritten.text))
            .await?;
        if self.counter.advance().is_none() {
            error!(index, "feed index space exhausted; further updates will be rejected");
        }
        Ok(Outcome::Published(update))
    }

    /// Move the relay onto its own task and return a handle for submitting
    /// work to it.
    pub fn spawn(self, queue_depth: usize) -> (RelayHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Job>(queue_depth.max(1));
        let handle = RelayHandle {
            tx,
            cache: Arc::clone(&self.cache),
            counter: Arc::clone(&self.counter),
        };

        let task = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = self.handle(job.ingress).await;
                // Caller may have hung up
                let _ = job.reply.send(result);
            }
            debug!("relay queue closed");
        });

        (handle, task)
    }
}

/// Cloneable front door to a running relay.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<Job>,
    cache: Arc<SegmentCache>,
    counter: Arc<FeedCounter>,
}

impl RelayHandle {
    /// Queue `ingress` and wait for the relay to finish with it.
    pub async fn submit(&self, ingress: Ingress) -> Result<Outcome> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Job { ingress, reply })
            .await
            .map_err(|_| RelayError::Closed)?;
        response.await.map_err(|_| RelayError::Closed)?
    }

    pub fn next_index(&self) -> u64 {
        self.counter.current()
    }

    pub fn cached_segments(&self) -> usize {
        self.cache.len()
    }

    /// Evict expired segments outside the queue, for requests that never
    /// reach the relay. Returns how many were dropped.
    pub fn maintain_cache(&self) -> usize {
        self.cache.maintain()
    }
}
