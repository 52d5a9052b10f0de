//! Swarm chunk primitives for swarmcast.
//!
//! Everything needed to publish a feed update without talking to the network:
//! - **address**: [`SwarmAddress`], the 32-byte chunk address
//! - **bmt**: Binary Merkle Tree hashing of a chunk body
//! - **cac**: [`ContentChunk`], content-addressed chunks
//! - **soc**: [`SingleOwnerChunk`], chunks bound to an owner and identifier
//! - **feed**: [`Topic`], [`identifier`] derivation and update payloads
//! - **signer**: the [`Signer`] capability and an in-memory [`LocalSigner`]
//!
//! # Publishing update `n`
//!
//! ```ignore
//! use swarmchunk::{feed, ContentChunk, LocalSigner, SingleOwnerChunk, Topic};
//!
//! let signer = LocalSigner::from_hex(&key_hex)?;
//! let topic = Topic::from_name("test radio");
//! let payload = feed::update_payload(now, &manifest_address);
//! let chunk = ContentChunk::new(payload)?;
//! let soc = SingleOwnerChunk::sign(feed::identifier(&topic, n), chunk, &signer)?;
//! // upload soc.chunk().data() to /soc/{owner}/{id}?sig={soc.signature_hex()}
//! ```

pub mod address;
pub mod bmt;
pub mod cac;
pub mod error;
pub mod feed;
pub mod signer;
pub mod soc;

pub use address::{SwarmAddress, SWARM_ADDRESS_SIZE};
pub use cac::ContentChunk;
pub use error::{ChunkError, Result};
pub use feed::{identifier, Identifier, Topic};
pub use signer::{LocalSigner, Signer};
pub use soc::SingleOwnerChunk;

// Hashing, owner addresses and signatures come straight from alloy.
pub use alloy_primitives::{keccak256, Address, Signature, B256};
