//! Replicated write envelope
//!
//! Wraps an encoded `WriteBufferBatch` with the writer id, sequence number
//! and CRC-32 that consumers use to detect corruption and drop duplicates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CodecError, Result};
use crate::wire::{self, decode_frame, skip_unknown, Table, TableReader, TableWriter};
use crate::write_buffer::{WriteBufferBatch, WriteBufferBatchView};

const WRITER: u8 = 0;
const SEQUENCE: u8 = 1;
const CHECKSUM: u8 = 2;
const PAYLOAD: u8 = 3;

/// A batch forwarded from one node to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedWrite {
    /// Originating writer (router/node) id
    pub writer: u32,

    /// Per-writer counter; restarts when the writer process restarts
    pub sequence: u64,

    /// CRC-32 (IEEE) of `payload`
    pub checksum: u32,

    /// Encoded `WriteBufferBatch`, untrusted until verified
    pub payload: Bytes,
}

/// Identity of a logical write for deduplication
///
/// Sequences of different writers are unrelated and never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub writer: u32,
    pub sequence: u64,
    pub checksum: u32,
}

/// CRC-32 used for replicated write payloads
pub fn checksum(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}

/// Build an envelope around `payload`, taking ownership of the buffer
pub fn wrap(writer: u32, sequence: u64, payload: impl Into<Bytes>) -> ReplicatedWrite {
    let payload = payload.into();
    let checksum = checksum(&payload);

    debug!(
        writer,
        sequence,
        checksum,
        payload_len = payload.len(),
        "wrapped replicated write"
    );

    ReplicatedWrite {
        writer,
        sequence,
        checksum,
        payload,
    }
}

/// Verify the payload checksum, then decode it as a `WriteBufferBatch`
///
/// On `ChecksumMismatch` the payload is never decoded.
pub fn unwrap(write: &ReplicatedWrite) -> Result<WriteBufferBatch> {
    write.verify()?;
    let batch = WriteBufferBatch::decode(&write.payload)?;

    debug!(
        writer = write.writer,
        sequence = write.sequence,
        entries = batch.entries.len(),
        "unwrapped replicated write"
    );

    Ok(batch)
}

impl ReplicatedWrite {
    /// Encode `batch` and wrap it
    pub fn from_batch(writer: u32, sequence: u64, batch: &WriteBufferBatch) -> Self {
        wrap(writer, sequence, batch.encode())
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            writer: self.writer,
            sequence: self.sequence,
            checksum: self.checksum,
        }
    }

    /// Recompute the payload CRC and compare it to the stored checksum
    pub fn verify(&self) -> Result<()> {
        let actual = checksum(&self.payload);
        if actual != self.checksum {
            warn!(
                writer = self.writer,
                sequence = self.sequence,
                expected = self.checksum,
                actual,
                "replicated write checksum mismatch"
            );
            return Err(CodecError::ChecksumMismatch {
                writer: self.writer,
                sequence: self.sequence,
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }

    /// Verified, fully decoded payload; see [`unwrap`]
    pub fn batch(&self) -> Result<WriteBufferBatch> {
        unwrap(self)
    }

    /// Verified payload as a lazily decoded view
    pub fn batch_view(&self) -> Result<WriteBufferBatchView<'_>> {
        self.verify()?;
        WriteBufferBatchView::parse(&self.payload)
    }

    // -------------------------------------------------------------------------
    // Envelope encoding
    // -------------------------------------------------------------------------

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    /// Decode an envelope, copying the payload out of `bytes`
    ///
    /// The checksum is not verified here.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }

    /// Like [`decode`](Self::decode), rejecting payloads over the configured limit
    pub fn decode_with(bytes: &[u8], config: &Config) -> Result<Self> {
        let raw = RawEnvelope::parse(decode_frame(bytes)?)?;
        raw.check_size(config)?;
        Ok(raw.into_owned(Bytes::copy_from_slice(raw.payload)))
    }

    /// Decode an envelope whose payload shares `buf` instead of being copied
    pub fn decode_shared(buf: &Bytes, config: &Config) -> Result<Self> {
        let raw = RawEnvelope::parse(decode_frame(buf)?)?;
        raw.check_size(config)?;
        Ok(raw.into_owned(buf.slice_ref(raw.payload)))
    }
}

impl Table for ReplicatedWrite {
    const NAME: &'static str = "ReplicatedWrite";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_u32(WRITER, self.writer);
        writer.write_u64(SEQUENCE, self.sequence);
        writer.write_u32(CHECKSUM, self.checksum);
        writer.write_bytes(PAYLOAD, &self.payload);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let raw = RawEnvelope::from_fields(fields)?;
        Ok(raw.into_owned(Bytes::copy_from_slice(raw.payload)))
    }
}

/// Envelope fields with the payload still borrowed from the input
#[derive(Debug, Clone, Copy)]
struct RawEnvelope<'a> {
    writer: u32,
    sequence: u64,
    checksum: u32,
    payload: &'a [u8],
}

impl<'a> RawEnvelope<'a> {
    fn parse(body: &'a [u8]) -> Result<Self> {
        Self::from_fields(TableReader::new(body))
    }

    fn from_fields(fields: TableReader<'a>) -> Result<Self> {
        let mut raw = RawEnvelope {
            writer: 0,
            sequence: 0,
            checksum: 0,
            payload: &[],
        };

        for field in fields {
            let field = field?;
            match field.id {
                WRITER => raw.writer = field.value.as_u32("writer")?,
                SEQUENCE => raw.sequence = field.value.as_u64("sequence")?,
                CHECKSUM => raw.checksum = field.value.as_u32("checksum")?,
                PAYLOAD => raw.payload = field.value.as_bytes("payload")?,
                _ => skip_unknown(ReplicatedWrite::NAME, &field),
            }
        }

        Ok(raw)
    }

    fn check_size(&self, config: &Config) -> Result<()> {
        if self.payload.len() > config.max_payload_size {
            return Err(CodecError::PayloadTooLarge {
                size: self.payload.len(),
                max: config.max_payload_size,
            });
        }
        Ok(())
    }

    fn into_owned(self, payload: Bytes) -> ReplicatedWrite {
        ReplicatedWrite {
            writer: self.writer,
            sequence: self.sequence,
            checksum: self.checksum,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_does_not_copy_payload() {
        let payload = Bytes::from_static(b"opaque");
        let write = wrap(1, 1, payload.clone());
        assert_eq!(write.payload.as_ptr(), payload.as_ptr());
    }

    #[test]
    fn test_known_crc_value() {
        // Standard CRC-32 check value
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(wrap(0, 0, &b"123456789"[..]).checksum, 0xCBF4_3926);
    }

    #[test]
    fn test_decode_does_not_verify() {
        let mut write = wrap(3, 9, &b"payload"[..]);
        write.checksum ^= 1;

        let decoded = ReplicatedWrite::decode(&write.encode()).unwrap();
        assert_eq!(decoded, write);
        assert!(matches!(
            decoded.verify(),
            Err(CodecError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_shared_slices_input() {
        let write = wrap(2, 5, &b"shared payload"[..]);
        let buf = Bytes::from(write.encode());

        let decoded = ReplicatedWrite::decode_shared(&buf, &Config::default()).unwrap();
        assert_eq!(decoded, write);

        let start = buf.as_ptr() as usize;
        let payload = decoded.payload.as_ptr() as usize;
        assert!(payload >= start && payload < start + buf.len());
    }

    #[test]
    fn test_decode_with_payload_limit() {
        let write = wrap(1, 1, vec![0u8; 100]);
        let bytes = write.encode();

        let tight = Config::builder().max_payload_size(99).build();
        assert!(matches!(
            ReplicatedWrite::decode_with(&bytes, &tight),
            Err(CodecError::PayloadTooLarge { size: 100, max: 99 })
        ));

        let exact = Config::builder().max_payload_size(100).build();
        assert_eq!(ReplicatedWrite::decode_with(&bytes, &exact).unwrap(), write);
    }

    #[test]
    fn test_dedup_key_fields() {
        let write = wrap(7, 42, &b"x"[..]);
        let key = write.dedup_key();
        assert_eq!(key.writer, 7);
        assert_eq!(key.sequence, 42);
        assert_eq!(key.checksum, write.checksum);
    }
}
