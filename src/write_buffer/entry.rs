//! Write buffer entries and batches
//!
//! Owned forms of the records carried inside a replicated write. Decoding goes
//! through the borrowed views in [`super::view`] and materializes the result.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wire::{self, decode_frame, skip_unknown, Table, TableReader, TableWriter};

use super::view::{WriteBufferBatchView, WriteBufferEntryView};
use super::TableWriteBatch;

// WriteBufferDelete fields
const DELETE_TABLE_NAME: u8 = 0;
const DELETE_PREDICATE: u8 = 1;

// WriteBufferEntry fields
pub(super) const PARTITION_KEY: u8 = 0;
pub(super) const TABLE_BATCHES: u8 = 1;
pub(super) const DELETE: u8 = 2;

// WriteBufferBatch fields
pub(super) const ENTRIES: u8 = 0;

/// A delete against one table of a partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBufferDelete {
    pub table_name: String,
    pub predicate: String,
}

/// Everything written to one partition
///
/// `table_batches` and `delete` may both be set; neither excludes the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBufferEntry {
    pub partition_key: String,
    pub table_batches: Vec<TableWriteBatch>,
    pub delete: Option<WriteBufferDelete>,
}

/// The unit carried as a replicated write payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBufferBatch {
    pub entries: Vec<WriteBufferEntry>,
}

// =============================================================================
// WriteBufferDelete
// =============================================================================

impl WriteBufferDelete {
    pub fn new(table_name: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            predicate: predicate.into(),
        }
    }
}

impl Table for WriteBufferDelete {
    const NAME: &'static str = "WriteBufferDelete";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(DELETE_TABLE_NAME, &self.table_name);
        writer.write_str(DELETE_PREDICATE, &self.predicate);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut delete = WriteBufferDelete::default();

        for field in fields {
            let field = field?;
            match field.id {
                DELETE_TABLE_NAME => {
                    delete.table_name = field.value.as_str("table_name")?.to_owned()
                }
                DELETE_PREDICATE => delete.predicate = field.value.as_str("predicate")?.to_owned(),
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        Ok(delete)
    }
}

// =============================================================================
// WriteBufferEntry
// =============================================================================

impl WriteBufferEntry {
    pub fn new(partition_key: impl Into<String>, table_batches: Vec<TableWriteBatch>) -> Self {
        Self {
            partition_key: partition_key.into(),
            table_batches,
            delete: None,
        }
    }

    pub fn with_delete(mut self, delete: WriteBufferDelete) -> Self {
        self.delete = Some(delete);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }
}

impl Table for WriteBufferEntry {
    const NAME: &'static str = "WriteBufferEntry";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(PARTITION_KEY, &self.partition_key);
        writer.write_vector(TABLE_BATCHES, &self.table_batches);
        if let Some(delete) = &self.delete {
            writer.write_table(DELETE, delete);
        }
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        WriteBufferEntryView::from_fields(fields)?.to_owned_entry()
    }
}

// =============================================================================
// WriteBufferBatch
// =============================================================================

impl WriteBufferBatch {
    pub fn new(entries: Vec<WriteBufferEntry>) -> Self {
        Self { entries }
    }

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }

    /// Assemble an encoded batch from individually encoded entries
    ///
    /// Each input must be a complete `WriteBufferEntry` message; only its
    /// frame is checked, the contents are copied through untouched.
    pub fn encode_from_entries(entries: &[&[u8]]) -> Result<Vec<u8>> {
        let bodies = entries
            .iter()
            .enumerate()
            .map(|(index, bytes)| decode_frame(bytes).map_err(|e| e.at_index("entries", index)))
            .collect::<Result<Vec<&[u8]>>>()?;

        let mut writer = TableWriter::with_capacity(bodies.iter().map(|b| b.len() + 4).sum());
        writer.write_raw_vector(ENTRIES, &bodies);
        Ok(writer.into_frame())
    }
}

impl Table for WriteBufferBatch {
    const NAME: &'static str = "WriteBufferBatch";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_vector(ENTRIES, &self.entries);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        WriteBufferBatchView::from_fields(fields)?.to_owned_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write_buffer::Row;

    #[test]
    fn test_absent_delete_is_none() {
        let entry = WriteBufferEntry::new("2020-01-01", vec![]);
        let decoded = WriteBufferEntry::decode(&entry.encode()).unwrap();
        assert!(decoded.delete.is_none());
    }

    #[test]
    fn test_empty_delete_is_some() {
        let entry = WriteBufferEntry::new("p", vec![]).with_delete(WriteBufferDelete::default());
        let decoded = WriteBufferEntry::decode(&entry.encode()).unwrap();
        assert_eq!(decoded.delete, Some(WriteBufferDelete::default()));
    }

    #[test]
    fn test_batches_and_delete_coexist() {
        let entry = WriteBufferEntry::new(
            "p",
            vec![TableWriteBatch::new("cpu", vec![Row::default().with("v", 1i64)])],
        )
        .with_delete(WriteBufferDelete::new("mem", "host = 'a'"));

        let decoded = WriteBufferEntry::decode(&entry.encode()).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(decoded.table_batches.len(), 1);
        assert!(decoded.delete.is_some());
    }

    #[test]
    fn test_encode_from_entries_matches_encode() {
        let first = WriteBufferEntry::new("a", vec![TableWriteBatch::new("t", vec![])]);
        let second = WriteBufferEntry::new("b", vec![]);

        let (a, b) = (first.encode(), second.encode());
        let assembled = WriteBufferBatch::encode_from_entries(&[a.as_slice(), b.as_slice()]).unwrap();
        let direct = WriteBufferBatch::new(vec![first, second]).encode();

        assert_eq!(assembled, direct);
    }

    #[test]
    fn test_encode_from_entries_rejects_truncated_input() {
        let entry = WriteBufferEntry::new("a", vec![]).encode();
        let result = WriteBufferBatch::encode_from_entries(&[entry.as_slice(), &entry[..entry.len() - 1]]);

        match result {
            Err(e) => assert_eq!(e.location().unwrap().to_string(), "entries[1]"),
            Ok(_) => panic!("Expected truncated entry to be rejected"),
        }
    }
}
