//! # delorean-wal
//!
//! Binary encodings for the write path of a time-series database:
//! - WAL entries: point writes and range deletes
//! - Write buffer batches: rows grouped by partition and table
//! - Replicated writes: a CRC-32 envelope with writer/sequence identity
//!   used to forward batches between nodes and drop duplicates
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Replication                              │
//! │      wrap / unwrap, CRC-32, sequences, dedup window          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ payload
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Write Buffer                              │
//! │     Batch → Entry(partition) → TableWriteBatch → Row         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │   Values    │
//!   │ Write/Delete│          │ Scalar/Col  │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │     Wire     │
//!               │ (tables, LE) │
//!               └──────────────┘
//! ```
//!
//! Every record is decoded from untrusted bytes: malformed input yields a
//! [`CodecError`] with the path to the offending field, never a panic.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wire;
pub mod value;
pub mod wal;
pub mod write_buffer;
pub mod replication;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CodecError, Location, Result};
pub use config::Config;
pub use value::{ColumnType, ColumnValue, ScalarValue};
pub use wal::{Delete, Entry, Point, Write};
pub use write_buffer::{
    Row, TableWriteBatch, Value, WriteBufferBatch, WriteBufferDelete, WriteBufferEntry,
};
pub use replication::{unwrap, wrap, DedupKey, Deduplicator, ReplicatedWrite, WriterSequence};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of delorean-wal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
