//! Error types for delorean-wal
//!
//! Provides a unified error type for all codec operations. Decode errors
//! carry a [`Location`] naming the field path of the offending bytes.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::wire::WireType;

/// Result type alias using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

/// One step in a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A named table field
    Field(&'static str),
    /// An element of a vector field
    Index(&'static str, usize),
}

/// Path from the outermost decoded table to the failing field,
/// e.g. `entries[0].table_batches[2].rows[5].values[1].value`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    segments: VecDeque<Segment>,
}

impl Location {
    /// The location of the message being decoded
    pub fn root() -> Self {
        Self::default()
    }

    /// A location consisting of a single field
    pub fn field(name: &'static str) -> Self {
        let mut location = Self::root();
        location.segments.push_back(Segment::Field(name));
        location
    }

    /// Segments from outermost to innermost
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_front(&mut self, segment: Segment) {
        self.segments.push_front(segment);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Field(name) => f.write_str(name)?,
                Segment::Index(name, index) => write!(f, "{}[{}]", name, index)?,
            }
        }
        Ok(())
    }
}

/// Unified error type for codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("truncated input at {location}: need {needed} bytes, {available} available")]
    TruncatedInput {
        location: Location,
        needed: usize,
        available: usize,
    },

    #[error("trailing bytes at {location}: {remaining} bytes after end of data")]
    TrailingBytes { location: Location, remaining: usize },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Field Errors
    // -------------------------------------------------------------------------
    #[error("unknown wire type 0x{wire_type:02x} at {location}")]
    UnknownWireType { location: Location, wire_type: u8 },

    #[error("unexpected wire type at {location}: expected {expected}, found {found}")]
    UnexpectedWireType {
        location: Location,
        expected: WireType,
        found: WireType,
    },

    #[error("invalid UTF-8 at {location}: {source}")]
    InvalidUtf8 {
        location: Location,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("invalid column type: {0}")]
    InvalidColumnType(u8),

    // -------------------------------------------------------------------------
    // Union Errors
    // -------------------------------------------------------------------------
    #[error("malformed union at {location}: {detail}")]
    MalformedUnion { location: Location, detail: String },

    #[error("entry at {location} has neither a write nor a delete")]
    EntryUnionEmpty { location: Location },

    #[error("entry at {location} has both a write and a delete")]
    EntryUnionAmbiguous { location: Location },

    // -------------------------------------------------------------------------
    // Integrity Errors
    // -------------------------------------------------------------------------
    #[error(
        "checksum mismatch for writer {writer} sequence {sequence}: expected 0x{expected:08X}, got 0x{actual:08X}"
    )]
    ChecksumMismatch {
        writer: u32,
        sequence: u64,
        expected: u32,
        actual: u32,
    },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        CodecError::TruncatedInput {
            location: Location::root(),
            needed,
            available,
        }
    }

    pub(crate) fn malformed_union(detail: impl Into<String>) -> Self {
        CodecError::MalformedUnion {
            location: Location::root(),
            detail: detail.into(),
        }
    }

    /// Prefix the error location with a field name
    pub fn in_field(self, name: &'static str) -> Self {
        self.within(Segment::Field(name))
    }

    /// Prefix the error location with a vector element
    pub fn at_index(self, name: &'static str, index: usize) -> Self {
        self.within(Segment::Index(name, index))
    }

    fn within(mut self, segment: Segment) -> Self {
        if let Some(location) = self.location_mut() {
            location.push_front(segment);
        }
        self
    }

    /// Where in the decoded structure the error occurred, if it is a decode error
    pub fn location(&self) -> Option<&Location> {
        match self {
            CodecError::TruncatedInput { location, .. }
            | CodecError::TrailingBytes { location, .. }
            | CodecError::UnknownWireType { location, .. }
            | CodecError::UnexpectedWireType { location, .. }
            | CodecError::InvalidUtf8 { location, .. }
            | CodecError::MalformedUnion { location, .. }
            | CodecError::EntryUnionEmpty { location }
            | CodecError::EntryUnionAmbiguous { location } => Some(location),
            _ => None,
        }
    }

    fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            CodecError::TruncatedInput { location, .. }
            | CodecError::TrailingBytes { location, .. }
            | CodecError::UnknownWireType { location, .. }
            | CodecError::UnexpectedWireType { location, .. }
            | CodecError::InvalidUtf8 { location, .. }
            | CodecError::MalformedUnion { location, .. }
            | CodecError::EntryUnionEmpty { location }
            | CodecError::EntryUnionAmbiguous { location } => Some(location),
            _ => None,
        }
    }
}
