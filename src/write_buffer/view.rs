//! Borrowed views
//!
//! Walk an encoded batch without materializing it. A batch may carry many
//! large table batches; the views decode them one at a time, on demand.
//!
//! Views borrow the input buffer. Strings handed out by the owned decoders
//! are copied, so call [`WriteBufferEntryView::to_owned_entry`] (or collect
//! the table batch iterator) before releasing a pooled buffer.

use crate::error::Result;
use crate::wire::{decode_frame, read_table, skip_unknown, Table, TableReader, VectorReader};

use super::entry::{DELETE, ENTRIES, PARTITION_KEY, TABLE_BATCHES};
use super::{TableWriteBatch, WriteBufferBatch, WriteBufferDelete, WriteBufferEntry};

// =============================================================================
// Batch View
// =============================================================================

/// Borrowed view of an encoded `WriteBufferBatch`
#[derive(Debug, Clone)]
pub struct WriteBufferBatchView<'a> {
    entries: Option<VectorReader<'a>>,
}

impl<'a> WriteBufferBatchView<'a> {
    /// Parse the outer frame and the batch's own fields
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        Self::from_fields(TableReader::new(decode_frame(bytes)?))
    }

    pub(crate) fn from_fields(fields: TableReader<'a>) -> Result<Self> {
        let mut entries = None;

        for field in fields {
            let field = field?;
            match field.id {
                ENTRIES => entries = Some(field.value.as_vector("entries")?),
                _ => skip_unknown(WriteBufferBatch::NAME, &field),
            }
        }

        Ok(Self { entries })
    }

    /// Number of entries the batch declares
    pub fn entry_count(&self) -> usize {
        self.entries.as_ref().map_or(0, VectorReader::declared_len)
    }

    /// Lazily parse each entry in order
    pub fn entries(&self) -> EntryViews<'a> {
        EntryViews {
            elements: self.entries.clone(),
            index: 0,
        }
    }

    pub fn to_owned_batch(&self) -> Result<WriteBufferBatch> {
        let mut entries = Vec::new();

        for (index, view) in self.entries().enumerate() {
            let entry = view?
                .to_owned_entry()
                .map_err(|e| e.at_index("entries", index))?;
            entries.push(entry);
        }

        Ok(WriteBufferBatch { entries })
    }
}

/// Iterator over the entries of a [`WriteBufferBatchView`]
#[derive(Debug, Clone)]
pub struct EntryViews<'a> {
    elements: Option<VectorReader<'a>>,
    index: usize,
}

impl<'a> Iterator for EntryViews<'a> {
    type Item = Result<WriteBufferEntryView<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let body = match self.elements.as_mut()?.next()? {
            Ok(body) => body,
            Err(e) => {
                self.elements = None;
                return Some(Err(e));
            }
        };

        let index = self.index;
        self.index += 1;

        let view = WriteBufferEntryView::from_fields(TableReader::new(body))
            .map_err(|e| e.at_index("entries", index));
        if view.is_err() {
            self.elements = None;
        }
        Some(view)
    }
}

// =============================================================================
// Entry View
// =============================================================================

/// Borrowed view of an encoded `WriteBufferEntry`
///
/// The partition key and delete are parsed up front; table batches are
/// decoded only as [`table_batches`](Self::table_batches) is iterated.
#[derive(Debug, Clone)]
pub struct WriteBufferEntryView<'a> {
    partition_key: &'a str,
    table_batches: Option<VectorReader<'a>>,
    delete: Option<WriteBufferDelete>,
}

impl<'a> WriteBufferEntryView<'a> {
    /// Parse a length-framed `WriteBufferEntry` message
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        Self::from_fields(TableReader::new(decode_frame(bytes)?))
    }

    pub(crate) fn from_fields(fields: TableReader<'a>) -> Result<Self> {
        let mut view = Self {
            partition_key: "",
            table_batches: None,
            delete: None,
        };

        for field in fields {
            let field = field?;
            match field.id {
                PARTITION_KEY => view.partition_key = field.value.as_str("partition_key")?,
                TABLE_BATCHES => {
                    view.table_batches = Some(field.value.as_vector("table_batches")?)
                }
                DELETE => view.delete = Some(read_table(&field.value, "delete")?),
                _ => skip_unknown(WriteBufferEntry::NAME, &field),
            }
        }

        Ok(view)
    }

    pub fn partition_key(&self) -> &'a str {
        self.partition_key
    }

    pub fn delete(&self) -> Option<&WriteBufferDelete> {
        self.delete.as_ref()
    }

    /// Number of table batches the entry declares
    pub fn table_batch_count(&self) -> usize {
        self.table_batches
            .as_ref()
            .map_or(0, VectorReader::declared_len)
    }

    /// Lazily decode each table batch in order
    pub fn table_batches(&self) -> TableBatches<'a> {
        TableBatches {
            elements: self.table_batches.clone(),
            index: 0,
        }
    }

    pub fn to_owned_entry(&self) -> Result<WriteBufferEntry> {
        Ok(WriteBufferEntry {
            partition_key: self.partition_key.to_owned(),
            table_batches: self.table_batches().collect::<Result<Vec<_>>>()?,
            delete: self.delete.clone(),
        })
    }
}

/// Iterator decoding the table batches of a [`WriteBufferEntryView`]
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct TableBatches<'a> {
    elements: Option<VectorReader<'a>>,
    index: usize,
}

impl<'a> Iterator for TableBatches<'a> {
    type Item = Result<TableWriteBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let body = match self.elements.as_mut()?.next()? {
            Ok(body) => body,
            Err(e) => {
                self.elements = None;
                return Some(Err(e));
            }
        };

        let index = self.index;
        self.index += 1;

        let batch = TableWriteBatch::read_fields(TableReader::new(body))
            .map_err(|e| e.at_index("table_batches", index));
        if batch.is_err() {
            self.elements = None;
        }
        Some(batch)
    }
}
