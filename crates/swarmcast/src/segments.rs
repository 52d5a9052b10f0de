//! Short-lived map from segment filename to its Swarm reference.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use swarmchunk::SwarmAddress;

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy)]
struct SegmentEntry {
    address: SwarmAddress,
    stored_at: Instant,
}

/// Segment references keyed by the filename the encoder uploaded them under.
///
/// One lock guards every operation. Entries older than the retention window
/// are dropped by [`maintain`](Self::maintain), which the relay runs after
/// each request rather than on a timer.
#[derive(Debug)]
pub struct SegmentCache {
    entries: Mutex<HashMap<String, SegmentEntry>>,
    retention: Duration,
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl SegmentCache {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    // A panic while holding the lock cannot leave a half-written entry,
    // so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SegmentEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn store(&self, name: impl Into<String>, address: SwarmAddress) {
        self.store_at(name, address, Instant::now());
    }

    pub fn store_at(&self, name: impl Into<String>, address: SwarmAddress, stored_at: Instant) {
        self.lock().insert(name.into(), SegmentEntry { address, stored_at });
    }

    /// Last address stored under `name`, or the zero address.
    pub fn get(&self, name: &str) -> SwarmAddress {
        self.lookup(name).unwrap_or(SwarmAddress::ZERO)
    }

    pub fn lookup(&self, name: &str) -> Option<SwarmAddress> {
        self.lock().get(name).map(|entry| entry.address)
    }

    /// Drop expired entries, returning how many went.
    pub fn maintain(&self) -> usize {
        self.maintain_at(Instant::now())
    }

    pub fn maintain_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.retention);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> SwarmAddress {
        SwarmAddress::new([byte; 32])
    }

    #[test]
    fn test_missing_name_resolves_to_zero() {
        let cache = SegmentCache::default();
        assert_eq!(cache.get("seg1.ts"), SwarmAddress::ZERO);
        assert!(cache.lookup("seg1.ts").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_overwrites() {
        let cache = SegmentCache::default();
        cache.store("seg1.ts", addr(1));
        cache.store("seg1.ts", addr(2));
        assert_eq!(cache.get("seg1.ts"), addr(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_survive_inside_retention() {
        let cache = SegmentCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.store_at("seg1.ts", addr(1), t0);

        assert_eq!(cache.maintain_at(t0 + Duration::from_secs(59)), 0);
        assert_eq!(cache.get("seg1.ts"), addr(1));
    }

    #[test]
    fn test_maintain_evicts_at_retention() {
        let cache = SegmentCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.store_at("old.ts", addr(1), t0);
        cache.store_at("new.ts", addr(2), t0 + Duration::from_secs(30));

        assert_eq!(cache.maintain_at(t0 + Duration::from_secs(60)), 1);
        assert_eq!(cache.get("old.ts"), SwarmAddress::ZERO);
        assert_eq!(cache.get("new.ts"), addr(2));
    }

    #[test]
    fn test_rewrite_refreshes_timestamp() {
        let cache = SegmentCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.store_at("seg.ts", addr(1), t0);
        cache.store_at("seg.ts", addr(1), t0 + Duration::from_secs(50));

        assert_eq!(cache.maintain_at(t0 + Duration::from_secs(70)), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = std::sync::Arc::new(SegmentCache::default());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        cache.store(format!("seg{}-{}.ts", i, j), addr(i));
                        cache.get("seg0-0.ts");
                    }
                    cache.maintain();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
