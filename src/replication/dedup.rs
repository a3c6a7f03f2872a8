//! Duplicate detection
//!
//! Consumer side of deduplication. Two envelopes with the same
//! `(writer, sequence, checksum)` are the same logical write; only the first
//! one seen within the window is accepted.
//!
//! Only verified envelopes are recorded. A corrupted copy must not claim the
//! key, or the intact retransmission that follows would be dropped.
//!
//! Sequence gaps are not interpreted: writers restart their counters and the
//! envelope carries no restart epoch, so a gap says nothing about loss.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::{Config, DEFAULT_DEDUP_WINDOW};
use crate::error::Result;

use super::{DedupKey, ReplicatedWrite};

/// Remembers the most recent keys, evicting the oldest first
#[derive(Debug, Clone)]
pub struct DedupWindow {
    capacity: usize,
    order: VecDeque<DedupKey>,
    seen: HashSet<DedupKey>,
    duplicates: u64,
}

impl DedupWindow {
    /// Containers grow on demand past the default window size
    pub fn new(capacity: usize) -> Self {
        let initial = capacity.min(DEFAULT_DEDUP_WINDOW);
        Self {
            capacity,
            order: VecDeque::with_capacity(initial),
            seen: HashSet::with_capacity(initial),
            duplicates: 0,
        }
    }

    /// Record `key`; returns `false` if it is already in the window
    pub fn observe(&mut self, key: DedupKey) -> bool {
        if self.seen.contains(&key) {
            self.duplicates += 1;
            return false;
        }

        if self.capacity == 0 {
            return true;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.order.push_back(key);
        self.seen.insert(key);
        true
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Duplicates rejected so far
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }
}

/// Thread-safe dedup window shared by consumer threads
#[derive(Debug)]
pub struct Deduplicator {
    window: Mutex<DedupWindow>,
}

impl Deduplicator {
    pub fn new(config: &Config) -> Self {
        Self {
            window: Mutex::new(DedupWindow::new(config.dedup_window)),
        }
    }

    /// Whether `write` is the first verified envelope seen with its key
    ///
    /// Fails with `ChecksumMismatch` without recording anything.
    pub fn accept(&self, write: &ReplicatedWrite) -> Result<bool> {
        write.verify()?;

        let key = write.dedup_key();
        let fresh = self.window.lock().observe(key);

        if !fresh {
            debug!(
                writer = key.writer,
                sequence = key.sequence,
                checksum = key.checksum,
                "dropping duplicate replicated write"
            );
        }
        Ok(fresh)
    }

    pub fn duplicates(&self) -> u64 {
        self.window.lock().duplicates()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::error::CodecError;
    use crate::replication::wrap;

    fn key(writer: u32, sequence: u64) -> DedupKey {
        DedupKey {
            writer,
            sequence,
            checksum: 0xABCD,
        }
    }

    #[test]
    fn test_repeat_rejected() {
        let mut window = DedupWindow::new(4);
        assert!(window.observe(key(1, 1)));
        assert!(!window.observe(key(1, 1)));
        assert_eq!(window.duplicates(), 1);
    }

    #[test]
    fn test_same_sequence_different_writer_accepted() {
        let mut window = DedupWindow::new(4);
        assert!(window.observe(key(1, 1)));
        assert!(window.observe(key(2, 1)));
    }

    #[test]
    fn test_same_sequence_different_checksum_accepted() {
        let mut window = DedupWindow::new(4);
        assert!(window.observe(key(1, 1)));
        assert!(window.observe(DedupKey {
            checksum: 0x1234,
            ..key(1, 1)
        }));
    }

    #[test]
    fn test_oldest_evicted() {
        let mut window = DedupWindow::new(2);
        window.observe(key(1, 1));
        window.observe(key(1, 2));
        window.observe(key(1, 3));

        assert_eq!(window.len(), 2);
        assert!(!window.contains(&key(1, 1)));
        assert!(window.observe(key(1, 1)));
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut window = DedupWindow::new(0);
        assert_eq!(window.capacity(), 0);
        assert!(window.observe(key(1, 1)));
        assert!(window.observe(key(1, 1)));
        assert!(window.is_empty());
    }

    #[test]
    fn test_deduplicator_accept() {
        let dedup = Deduplicator::new(&Config::default());
        let write = wrap(9, 1, &b"payload"[..]);

        assert!(dedup.accept(&write).unwrap());
        assert!(!dedup.accept(&write.clone()).unwrap());
        assert!(dedup.accept(&wrap(9, 2, &b"payload"[..])).unwrap());
        assert_eq!(dedup.duplicates(), 1);
    }

    #[test]
    fn test_corrupted_copy_does_not_claim_key() {
        let dedup = Deduplicator::new(&Config::default());
        let good = wrap(7, 1, &b"payload"[..]);
        let corrupted = ReplicatedWrite {
            payload: Bytes::from_static(b"pAyload"),
            ..good.clone()
        };

        assert!(matches!(
            dedup.accept(&corrupted),
            Err(CodecError::ChecksumMismatch { .. })
        ));
        assert!(dedup.accept(&good).unwrap());
        assert!(!dedup.accept(&good).unwrap());
    }

    #[test]
    fn test_huge_window_allocates_lazily() {
        let window = DedupWindow::new(usize::MAX);
        assert_eq!(window.capacity(), usize::MAX);
        assert!(window.is_empty());

        let dedup = Deduplicator::new(&Config::builder().dedup_window(usize::MAX).build());
        assert!(dedup.accept(&wrap(1, 1, &b"x"[..])).unwrap());
    }
}
