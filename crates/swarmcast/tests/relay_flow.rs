//! Relay behaviour over the in-memory storage: ordering, counting, retries.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use swarmcast::feed_index::FeedCounter;
use swarmcast::manifest::Rewriter;
use swarmcast::testing::MemoryStorage;
use swarmcast::{FeedPublisher, Ingress, Outcome, Relay, RelayHandle, SegmentCache};
use swarmchunk::{feed, LocalSigner, Topic};

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

fn spawn_relay(storage: Arc<MemoryStorage>, start: u64, retention: Duration) -> RelayHandle {
    let signer = Arc::new(LocalSigner::from_hex(KEY).unwrap());
    let publisher = FeedPublisher::new(storage.clone(), signer, Topic::from_name("test radio"));
    let relay = Relay::new(
        storage,
        publisher,
        Rewriter::default(),
        Arc::new(SegmentCache::new(retention)),
        Arc::new(FeedCounter::new(start)),
    );
    relay.spawn(16).0
}

fn segment(name: &str, body: &'static [u8]) -> Ingress {
    Ingress::classify(&format!("/live/{}", name), Bytes::from_static(body), ".m3u8")
}

fn playlist(text: &str) -> Ingress {
    Ingress::classify("/live/index.m3u8", Bytes::from(text.to_string()), ".m3u8")
}

#[tokio::test]
async fn n_publishes_advance_counter_by_n() {
    let storage = Arc::new(MemoryStorage::default());
    let relay = spawn_relay(storage.clone(), 100, Duration::from_secs(3600));

    for i in 0..10 {
        let outcome = relay.submit(playlist(&format!("#EXTM3U\n#{}", i))).await.unwrap();
        match outcome {
            Outcome::Published(update) => assert_eq!(update.index, 100 + i),
            other => panic!("unexpected {:?}", other),
        }
    }
    assert_eq!(relay.next_index(), 110);
    assert_eq!(storage.socs().len(), 10);
}

#[tokio::test]
async fn failures_leave_counter_and_retry_uses_same_identifier() {
    let storage = Arc::new(MemoryStorage::default());
    let relay = spawn_relay(storage.clone(), 0, Duration::from_secs(3600));

    relay.submit(playlist("#EXTM3U\n")).await.unwrap();
    assert_eq!(relay.next_index(), 1);

    storage.fail_uploads(true);
    assert!(relay.submit(playlist("#EXTM3U\n")).await.is_err());
    storage.fail_uploads(false);
    storage.fail_socs(true);
    assert!(relay.submit(playlist("#EXTM3U\n")).await.is_err());
    assert_eq!(relay.next_index(), 1);

    storage.fail_socs(false);
    let Outcome::Published(update) = relay.submit(playlist("#EXTM3U\n")).await.unwrap() else {
        panic!("expected a publish");
    };
    assert_eq!(update.index, 1);
    assert_eq!(update.identifier, feed::identifier(&Topic::from_name("test radio"), 1));
    assert_eq!(relay.next_index(), 2);

    let ids: Vec<_> = storage.socs().iter().map(|soc| *soc.id()).collect();
    assert_eq!(
        ids,
        vec![
            feed::identifier(&Topic::from_name("test radio"), 0),
            feed::identifier(&Topic::from_name("test radio"), 1),
        ]
    );
}

#[tokio::test]
async fn published_playlist_points_at_uploaded_segments() {
    let storage = Arc::new(MemoryStorage::default());
    let relay = spawn_relay(storage.clone(), 0, Duration::from_secs(3600));

    relay.submit(segment("seg1.ts", b"one")).await.unwrap();
    relay.submit(segment("seg2.ts", b"two")).await.unwrap();
    assert_eq!(relay.cached_segments(), 2);

    relay
        .submit(playlist("#EXTM3U\n#EXTINF:2.0,\nseg1.ts\n#EXTINF:2.0,\nseg2.ts\n#EXTINF:2.0,\nseg3.ts\n"))
        .await
        .unwrap();

    let uploads = storage.uploaded();
    let manifest = std::str::from_utf8(uploads.last().unwrap()).unwrap();
    let lines: Vec<&str> = manifest.split('\n').collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[2], format!("/bytes/{}", MemoryStorage::address_of(b"one").to_hex()));
    assert_eq!(lines[4], format!("/bytes/{}", MemoryStorage::address_of(b"two").to_hex()));
    assert_eq!(lines[6], format!("/bytes/{}", "0".repeat(64)));
}

#[tokio::test]
async fn stale_segments_are_evicted_after_a_request() {
    let storage = Arc::new(MemoryStorage::default());
    let relay = spawn_relay(storage.clone(), 0, Duration::from_millis(50));

    relay.submit(segment("seg1.ts", b"one")).await.unwrap();
    assert_eq!(relay.cached_segments(), 1);

    tokio::time::sleep(Duration::from_millis(120)).await;

    // Maintenance runs after every request, including failed ones
    storage.fail_uploads(true);
    assert!(relay.submit(segment("seg2.ts", b"two")).await.is_err());
    assert_eq!(relay.cached_segments(), 0);
}

#[tokio::test]
async fn closed_relay_reports_closed() {
    let storage = Arc::new(MemoryStorage::default());
    let signer = Arc::new(LocalSigner::from_hex(KEY).unwrap());
    let publisher = FeedPublisher::new(storage.clone(), signer, Topic::from_name("test radio"));
    let relay = Relay::new(
        storage,
        publisher,
        Rewriter::default(),
        Arc::new(SegmentCache::default()),
        Arc::new(FeedCounter::new(0)),
    );
    let (handle, task) = relay.spawn(1);
    task.abort();
    let _ = task.await;

    let result = handle.submit(segment("seg1.ts", b"one")).await;
    assert!(matches!(result, Err(swarmcast::RelayError::Closed)));
}
