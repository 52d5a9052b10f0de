//! Feed identity and relay behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Who publishes the feed, under which topic, paid for by which batch.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Hex-encoded secp256k1 private key of the feed owner. Required.
    #[serde(default)]
    pub private_key: String,

    /// Postage batch id sent with every upload. Required.
    #[serde(default)]
    pub batch_id: String,

    /// Topic name; hashed with keccak-256 to form the feed topic.
    /// Default: "test radio"
    #[serde(default = "FeedConfig::default_topic")]
    pub topic: String,

    /// How far back a feed lookup may roll. Accepted and validated, not yet
    /// consulted by the index resolver.
    /// Default: 7d
    #[serde(default = "FeedConfig::default_since")]
    pub since: String,
}

impl FeedConfig {
    fn default_topic() -> String {
        "test radio".to_string()
    }

    fn default_since() -> String {
        "7d".to_string()
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            private_key: String::new(),
            batch_id: String::new(),
            topic: Self::default_topic(),
            since: Self::default_since(),
        }
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("private_key", &redact(&self.private_key))
            .field("batch_id", &self.batch_id)
            .field("topic", &self.topic)
            .field("since", &self.since)
            .finish()
    }
}

pub(crate) fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// How the ingress relay recognises and retains things.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Substring of the request filename that marks a playlist.
    /// Default: .m3u8
    #[serde(default = "RelayConfig::default_playlist_marker")]
    pub playlist_marker: String,

    /// Substring of a playlist line that marks a segment reference.
    /// Default: .ts
    #[serde(default = "RelayConfig::default_segment_marker")]
    pub segment_marker: String,

    /// How long an uploaded segment stays resolvable, in seconds.
    /// Default: 3600
    #[serde(default = "RelayConfig::default_segment_retention_secs")]
    pub segment_retention_secs: u64,

    /// Largest accepted request body, in bytes.
    /// Default: 64 MiB
    #[serde(default = "RelayConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Pending requests the relay queue holds before callers wait.
    /// Default: 64
    #[serde(default = "RelayConfig::default_queue_depth")]
    pub queue_depth: usize,
}

impl RelayConfig {
    fn default_playlist_marker() -> String {
        ".m3u8".to_string()
    }

    fn default_segment_marker() -> String {
        ".ts".to_string()
    }

    fn default_segment_retention_secs() -> u64 {
        3600
    }

    fn default_max_body_bytes() -> usize {
        64 * 1024 * 1024
    }

    fn default_queue_depth() -> usize {
        64
    }

    pub fn segment_retention(&self) -> Duration {
        Duration::from_secs(self.segment_retention_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            playlist_marker: Self::default_playlist_marker(),
            segment_marker: Self::default_segment_marker(),
            segment_retention_secs: Self::default_segment_retention_secs(),
            max_body_bytes: Self::default_max_body_bytes(),
            queue_depth: Self::default_queue_depth(),
        }
    }
}

/// Parse a duration like `500ms`, `30s`, `15m`, `12h` or `7d`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    let value: u64 = digits.parse().ok()?;

    let secs = match unit.trim() {
        "ms" => return Some(Duration::from_millis(value)),
        "" | "s" => value,
        "m" => value.checked_mul(60)?,
        "h" => value.checked_mul(3600)?,
        "d" => value.checked_mul(86_400)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
