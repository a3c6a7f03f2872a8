//! Writer sequence numbers
//!
//! Producer side of deduplication: each writer stamps its envelopes with a
//! strictly increasing sequence. The counter lives in memory and starts over
//! when the writer process restarts.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::config::Config;
use crate::write_buffer::WriteBufferBatch;

use super::{wrap, ReplicatedWrite};

/// Hands out sequence numbers for one writer
#[derive(Debug)]
pub struct WriterSequence {
    writer: u32,
    next: AtomicU64,
}

impl WriterSequence {
    /// Start at `config.sequence_start`
    pub fn new(writer: u32, config: &Config) -> Self {
        Self::starting_at(writer, config.sequence_start)
    }

    pub fn starting_at(writer: u32, start: u64) -> Self {
        Self {
            writer,
            next: AtomicU64::new(start),
        }
    }

    pub fn writer(&self) -> u32 {
        self.writer
    }

    /// The sequence the next call to [`next_sequence`](Self::next_sequence) returns
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Acquire)
    }

    pub fn next_sequence(&self) -> u64 {
        self.next.fetch_add(1, Ordering::AcqRel)
    }

    /// Wrap `payload` with the next sequence number
    pub fn next_write(&self, payload: impl Into<Bytes>) -> ReplicatedWrite {
        wrap(self.writer, self.next_sequence(), payload)
    }

    /// Encode `batch` and wrap it with the next sequence number
    pub fn next_batch(&self, batch: &WriteBufferBatch) -> ReplicatedWrite {
        self.next_write(batch.encode())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_starts_at_configured_value() {
        let sequence = WriterSequence::new(3, &Config::default());
        assert_eq!(sequence.peek(), 1);

        let zero_based = WriterSequence::new(3, &Config::builder().sequence_start(0).build());
        assert_eq!(zero_based.next_sequence(), 0);
        assert_eq!(zero_based.next_sequence(), 1);
    }

    #[test]
    fn test_next_write_stamps_writer_and_sequence() {
        let sequence = WriterSequence::starting_at(7, 10);
        let first = sequence.next_write(&b"a"[..]);
        let second = sequence.next_batch(&WriteBufferBatch::default());

        assert_eq!((first.writer, first.sequence), (7, 10));
        assert_eq!((second.writer, second.sequence), (7, 11));
        assert!(second.verify().is_ok());
    }

    #[test]
    fn test_concurrent_sequences_unique() {
        let sequence = Arc::new(WriterSequence::starting_at(1, 1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sequence = Arc::clone(&sequence);
                thread::spawn(move || (0..250).map(|_| sequence.next_sequence()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value));
            }
        }
        assert_eq!(seen.len(), 1000);
        assert_eq!(sequence.peek(), 1001);
    }
}
