//! Write Buffer Module
//!
//! Row-oriented records grouped by partition and table.
//!
//! ## Layout
//! ```text
//! WriteBufferBatch { 0: entries [WriteBufferEntry] }
//!
//! WriteBufferEntry
//! ├── 0: partition_key   string
//! ├── 1: table_batches   [TableWriteBatch { 0: name, 1: rows [Row] }]
//! └── 2: delete          WriteBufferDelete { 0: table_name, 1: predicate }  (optional)
//!
//! Row   { 0: values [Value] }
//! Value { 0: column, 1: value_type, 2: value }
//! ```
//!
//! Row and column order always round-trips; duplicate column names within a
//! row are preserved as written.

mod entry;
mod row;
mod view;

pub use entry::{WriteBufferBatch, WriteBufferDelete, WriteBufferEntry};
pub use row::{Row, TableWriteBatch, Value};
pub use view::{EntryViews, TableBatches, WriteBufferBatchView, WriteBufferEntryView};
