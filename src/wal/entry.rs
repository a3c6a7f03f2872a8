//! WAL entries
//!
//! An entry is either a batch of points or a predicate delete.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Location, Result};
use crate::wire::{self, read_table, read_vector, skip_unknown, Table, TableReader, TableWriter};

use super::Point;

// Write fields
const POINTS: u8 = 0;

// Delete fields
const PREDICATE: u8 = 0;
const START_TIME: u8 = 1;
const STOP_TIME: u8 = 2;

// Entry fields
const WRITE: u8 = 0;
const DELETE: u8 = 1;

/// Points written together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Write {
    pub points: Vec<Point>,
}

/// A predicate delete over a time range
///
/// The range is carried as given; `start_time > stop_time` is not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delete {
    pub predicate: String,
    pub start_time: i64,
    pub stop_time: i64,
}

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Write(Write),
    Delete(Delete),
}

// =============================================================================
// Write
// =============================================================================

impl Write {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Table for Write {
    const NAME: &'static str = "Write";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_vector(POINTS, &self.points);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut points = Vec::new();

        for field in fields {
            let field = field?;
            match field.id {
                POINTS => points = read_vector(&field.value, "points")?,
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        Ok(Self { points })
    }
}

// =============================================================================
// Delete
// =============================================================================

impl Delete {
    pub fn new(predicate: impl Into<String>, start_time: i64, stop_time: i64) -> Self {
        Self {
            predicate: predicate.into(),
            start_time,
            stop_time,
        }
    }

    /// Whether `start_time <= stop_time`; left for consumers to enforce
    pub fn is_ordered(&self) -> bool {
        self.start_time <= self.stop_time
    }
}

impl Table for Delete {
    const NAME: &'static str = "Delete";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(PREDICATE, &self.predicate);
        writer.write_i64(START_TIME, self.start_time);
        writer.write_i64(STOP_TIME, self.stop_time);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut delete = Delete::new(String::new(), 0, 0);

        for field in fields {
            let field = field?;
            match field.id {
                PREDICATE => delete.predicate = field.value.as_str("predicate")?.to_owned(),
                START_TIME => delete.start_time = field.value.as_i64("start_time")?,
                STOP_TIME => delete.stop_time = field.value.as_i64("stop_time")?,
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        Ok(delete)
    }
}

// =============================================================================
// Entry
// =============================================================================

impl Entry {
    pub fn write(points: Vec<Point>) -> Self {
        Entry::Write(Write::new(points))
    }

    pub fn delete(predicate: impl Into<String>, start_time: i64, stop_time: i64) -> Self {
        Entry::Delete(Delete::new(predicate, start_time, stop_time))
    }

    /// Encode to a length-framed message
    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    /// Decode a length-framed message
    ///
    /// Fails with `EntryUnionEmpty` if neither a write nor a delete is
    /// present and `EntryUnionAmbiguous` if both are.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }
}

impl Table for Entry {
    const NAME: &'static str = "Entry";

    fn write_fields(&self, writer: &mut TableWriter) {
        match self {
            Entry::Write(write) => writer.write_table(WRITE, write),
            Entry::Delete(delete) => writer.write_table(DELETE, delete),
        }
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut write: Option<Write> = None;
        let mut delete: Option<Delete> = None;

        for field in fields {
            let field = field?;
            match field.id {
                WRITE => write = Some(read_table(&field.value, "write")?),
                DELETE => delete = Some(read_table(&field.value, "delete")?),
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        match (write, delete) {
            (Some(write), None) => Ok(Entry::Write(write)),
            (None, Some(delete)) => Ok(Entry::Delete(delete)),
            (None, None) => Err(CodecError::EntryUnionEmpty {
                location: Location::root(),
            }),
            (Some(_), Some(_)) => Err(CodecError::EntryUnionAmbiguous {
                location: Location::root(),
            }),
        }
    }
}
