//! The feed index counter and where it starts.

use std::sync::atomic::{AtomicU64, Ordering};

use swarmchunk::{Address, Topic};
use tracing::info;

use crate::bee::StorageApi;
use crate::error::BeeError;

/// Work out which index the next update should be written at.
///
/// A feed that has never been written starts at 0; otherwise the update after
/// the latest one. Any other lookup failure is returned to the caller, which
/// treats it as fatal at startup.
pub async fn resolve_start_index(
    storage: &dyn StorageApi,
    owner: &Address,
    topic: &Topic,
) -> Result<u64, BeeError> {
    match storage.feed_index(owner, topic).await? {
        None => {
            info!(%owner, %topic, "no prior feed, starting at index 0");
            Ok(0)
        }
        Some(last) => {
            let next = last.checked_add(1).ok_or_else(|| BeeError::InvalidIndex {
                value: format!("{:016x}", last),
                message: "feed index space exhausted".to_string(),
            })?;
            info!(%owner, %topic, last, next, "resuming feed");
            Ok(next)
        }
    }
}

/// Next index to publish at.
///
/// Shared so the health endpoint can read it; only the relay advances it.
#[derive(Debug)]
pub struct FeedCounter {
    next: AtomicU64,
}

impl FeedCounter {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    pub fn current(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Move past a confirmed publish, returning the new next index.
    ///
    /// Returns `None` once the index space is used up; the counter then stays
    /// at `u64::MAX`.
    pub fn advance(&self) -> Option<u64> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }
}
