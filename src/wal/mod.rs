//! Write-Ahead Log (WAL) Record Module
//!
//! Encodes the records a WAL is made of. Appending, syncing and replaying the
//! log belong to the embedding system; this module only turns entries into
//! bytes and back.
//!
//! ## Entry Layout
//! ```text
//! Entry
//! ├── 0: write   Write  { 0: points [Point] }
//! └── 1: delete  Delete { 0: predicate, 1: start_time, 2: stop_time }
//!
//! Point { 0: key, 1: time, 2: value_type, 3: value }
//! ```
//!
//! Exactly one of `write` / `delete` must be present.

mod entry;
mod point;

pub use entry::{Delete, Entry, Write};
pub use point::Point;
