//! Stream-based I/O helpers
//!
//! Read and write back-to-back envelope frames on any `Read`/`Write`. The
//! transport itself (files, sockets) belongs to the caller.

use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;

use crate::config::Config;
use crate::error::{CodecError, Result};
use crate::wire::LEN_PREFIX_SIZE;

use super::ReplicatedWrite;

/// Room allowed for envelope fields besides the payload
pub const MAX_ENVELOPE_OVERHEAD: usize = 1024;

/// Write an envelope frame to a stream
pub fn write_replicated_write<W: Write>(writer: &mut W, write: &ReplicatedWrite) -> Result<()> {
    let bytes = write.encode();
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read the next envelope frame from a stream
///
/// Returns `Ok(None)` on a clean end of stream and `TruncatedInput` if the
/// stream ends part way through a frame. The payload shares the frame buffer.
pub fn read_replicated_write<R: Read>(
    reader: &mut R,
    config: &Config,
) -> Result<Option<ReplicatedWrite>> {
    let mut header = [0u8; LEN_PREFIX_SIZE];
    let filled = read_fully(reader, &mut header)?;

    if filled == 0 {
        return Ok(None);
    }
    if filled < LEN_PREFIX_SIZE {
        return Err(CodecError::truncated(LEN_PREFIX_SIZE, filled));
    }

    let body_len = u32::from_le_bytes(header) as usize;
    let max = config.max_payload_size.saturating_add(MAX_ENVELOPE_OVERHEAD);
    if body_len > max {
        return Err(CodecError::PayloadTooLarge {
            size: body_len,
            max,
        });
    }

    let mut frame = vec![0u8; LEN_PREFIX_SIZE + body_len];
    frame[..LEN_PREFIX_SIZE].copy_from_slice(&header);

    let read = read_fully(reader, &mut frame[LEN_PREFIX_SIZE..])?;
    if read < body_len {
        return Err(CodecError::truncated(body_len, read));
    }

    ReplicatedWrite::decode_shared(&Bytes::from(frame), config).map(Some)
}

/// Fill `buf` as far as the stream allows, returning the bytes read
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Iterator over the envelopes of a stream
///
/// Ends after the first error.
pub struct ReplicatedWriteReader<R> {
    reader: R,
    config: Config,
    done: bool,
}

impl<R: Read> ReplicatedWriteReader<R> {
    pub fn new(reader: R, config: Config) -> Self {
        Self {
            reader,
            config,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ReplicatedWriteReader<R> {
    type Item = Result<ReplicatedWrite>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match read_replicated_write(&mut self.reader, &self.config) {
            Ok(Some(write)) => Some(Ok(write)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
