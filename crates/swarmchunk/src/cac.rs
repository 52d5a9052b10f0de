//! Content-addressed chunks.

use crate::address::SwarmAddress;
use crate::bmt::{self, CHUNK_SIZE, SPAN_SIZE};
use crate::error::{ChunkError, Result};

/// A payload of at most [`CHUNK_SIZE`] bytes addressed by its BMT hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    span: [u8; SPAN_SIZE],
    payload: Vec<u8>,
    address: SwarmAddress,
}

impl ContentChunk {
    /// Wrap `payload` and compute its address.
    pub fn new(payload: impl Into<Vec<u8>>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > CHUNK_SIZE {
            return Err(ChunkError::PayloadTooLarge {
                size: payload.len(),
                max: CHUNK_SIZE,
            });
        }

        let span = bmt::span(payload.len() as u64);
        let address = bmt::chunk_address(&span, &payload)?;
        Ok(Self {
            span,
            payload,
            address,
        })
    }

    pub fn address(&self) -> SwarmAddress {
        self.address
    }

    /// Length of the payload as recorded in the span.
    pub fn span(&self) -> u64 {
        u64::from_le_bytes(self.span)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Wire form: `span || payload`.
    pub fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(SPAN_SIZE + self.payload.len());
        data.extend_from_slice(&self.span);
        data.extend_from_slice(&self.payload);
        data
    }
}
