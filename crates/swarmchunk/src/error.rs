//! Errors produced while building, addressing or signing chunks.

use thiserror::Error;

/// Errors that can occur when working with Swarm chunk primitives.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("payload of {size} bytes exceeds chunk size {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature recovery failed: {0}")]
    Recovery(String),
}

pub type Result<T> = std::result::Result<T, ChunkError>;
