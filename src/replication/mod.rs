//! Replication Module
//!
//! The envelope used to forward write buffer batches between nodes.
//!
//! ## Envelope Format
//! ```text
//! ┌────────────┬──────────────┬──────────────┬──────────────────────┐
//! │ Writer (4) │ Sequence (8) │ CRC32 (4)    │ Payload (len + bytes)│
//! └────────────┴──────────────┴──────────────┴──────────────────────┘
//! ```
//! Each value travels as a field of a wire table (ids 0..=3), so the envelope
//! is framed and can grow like every other record.
//!
//! ## Flow
//! - Producer: `WriteBufferBatch` → `encode` → [`wrap`] (CRC-32 of payload)
//! - Consumer: [`Deduplicator::accept`] (verify, then record the key) →
//!   [`unwrap`] (decode)
//!
//! A checksum mismatch means the payload must be discarded; it is never
//! decoded.

mod dedup;
mod envelope;
mod sequence;
mod stream;

pub use dedup::{DedupWindow, Deduplicator};
pub use envelope::{checksum, unwrap, wrap, DedupKey, ReplicatedWrite};
pub use sequence::WriterSequence;
pub use stream::{
    read_replicated_write, write_replicated_write, ReplicatedWriteReader, MAX_ENVELOPE_OVERHEAD,
};
