//! swarmcast - relays a live HLS stream into Swarm behind a signed feed
//!
//! This library provides:
//! - `bee`: Bee HTTP API client and the `StorageApi` seam
//! - `segments`: short-lived segment name → reference cache
//! - `manifest`: playlist rewriting to `/bytes/<ref>` lines
//! - `publisher`: signed feed updates (manifest → CAC → SOC)
//! - `feed_index`: start index resolution and the publish counter
//! - `relay`: the single-writer relay actor
//! - `serve`: HTTP ingress and health
//! - `telemetry`: tracing and OTLP export
//! - `testing`: test doubles for storage and signing (`testing` feature)

pub mod bee;
pub mod commands;
pub mod error;
pub mod feed_index;
pub mod manifest;
pub mod publisher;
pub mod relay;
pub mod segments;
pub mod serve;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bee::{BeeClient, StorageApi};
pub use error::{BeeError, RelayError};
pub use publisher::{FeedPublisher, PublishedUpdate};
pub use relay::{Ingress, Outcome, Relay, RelayHandle};
pub use segments::SegmentCache;
