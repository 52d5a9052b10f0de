//! Error types for the relay.

use thiserror::Error;

/// Failures talking to the Bee HTTP API.
#[derive(Debug, Error)]
pub enum BeeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bee returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid feed index {value:?}: {message}")]
    InvalidIndex { value: String, message: String },
}

impl BeeError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            BeeError::Timeout {
                url: url.to_string(),
            }
        } else {
            BeeError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Per-request failures inside the relay. None of these stop the service.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Bee(#[from] BeeError),

    #[error(transparent)]
    Chunk(#[from] swarmchunk::ChunkError),

    #[error("manifest is not valid UTF-8: {0}")]
    InvalidManifest(#[from] std::str::Utf8Error),

    #[error("relay is not running")]
    Closed,
}

pub type Result<T> = std::result::Result<T, RelayError>;
