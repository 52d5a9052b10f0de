//! Binary Merkle Tree hash over a single chunk body.
//!
//! The body is zero-padded to [`CHUNK_SIZE`], split into 32-byte segments and
//! hashed pairwise with keccak-256 up to a single root. The chunk address is
//! `keccak256(span || root)` where `span` is the little-endian payload length.

use alloy_primitives::{keccak256, B256};

use crate::address::SwarmAddress;
use crate::error::{ChunkError, Result};

pub const SEGMENT_SIZE: usize = 32;
pub const BRANCHES: usize = 128;
pub const CHUNK_SIZE: usize = SEGMENT_SIZE * BRANCHES;
pub const SPAN_SIZE: usize = 8;

/// Encode a payload length as a chunk span.
pub fn span(len: u64) -> [u8; SPAN_SIZE] {
    len.to_le_bytes()
}

/// Compute the BMT root of `data` (at most [`CHUNK_SIZE`] bytes).
pub fn root(data: &[u8]) -> Result<B256> {
    if data.len() > CHUNK_SIZE {
        return Err(ChunkError::PayloadTooLarge {
            size: data.len(),
            max: CHUNK_SIZE,
        });
    }

    let mut body = [0u8; CHUNK_SIZE];
    body[..data.len()].copy_from_slice(data);

    let mut level: Vec<B256> = body.chunks_exact(2 * SEGMENT_SIZE).map(keccak256).collect();
    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut node = [0u8; 2 * SEGMENT_SIZE];
                node[..SEGMENT_SIZE].copy_from_slice(pair[0].as_slice());
                node[SEGMENT_SIZE..].copy_from_slice(pair[1].as_slice());
                keccak256(node)
            })
            .collect();
    }

    Ok(level[0])
}

/// Address of a content-addressed chunk with the given span and payload.
pub fn chunk_address(span: &[u8; SPAN_SIZE], payload: &[u8]) -> Result<SwarmAddress> {
    let root = root(payload)?;
    let mut buf = [0u8; SPAN_SIZE + SEGMENT_SIZE];
    buf[..SPAN_SIZE].copy_from_slice(span);
    buf[SPAN_SIZE..].copy_from_slice(root.as_slice());
    Ok(keccak256(buf).into())
}
