//! Wire Module
//!
//! Field-tagged binary tables, the building block for every record in the crate.
//!
//! ## Message Format
//! ```text
//! ┌──────────┬─────────────────────────────────────────┐
//! │ Len (4)  │  Table body (exactly Len bytes)          │
//! └──────────┴─────────────────────────────────────────┘
//! ```
//!
//! ### Table Body
//! ```text
//! ┌────────┬──────────┬───────────────┬────────┬──────────┬─────────
//! │ Id (1) │ Wire (1) │   Payload     │ Id (1) │ Wire (1) │  ...
//! └────────┴──────────┴───────────────┴────────┴──────────┴─────────
//! ```
//!
//! ### Wire Types
//! - 0x00: BYTE     - 1 byte
//! - 0x01: FIXED32  - 4 bytes, little-endian
//! - 0x02: FIXED64  - 8 bytes, little-endian
//! - 0x03: BYTES    - len (4) + raw bytes (strings, nested tables, vectors)
//!
//! ### Vectors
//! A vector is a BYTES payload holding `count (4)` followed by `count`
//! elements, each `len (4) + table body`.
//!
//! Field ids are stable. Decoders skip ids they do not know, so tables can
//! grow new fields without breaking old readers.

mod reader;
mod writer;

use std::fmt;

use crate::error::{CodecError, Location, Result};

pub use reader::{decode_frame, ByteReader, Field, FieldValue, TableReader, VectorReader};
pub use writer::{TableWriter, MAX_WIRE_LEN};

/// Size of every length prefix (frames, BYTES payloads, vector elements)
pub const LEN_PREFIX_SIZE: usize = 4;

/// How a field's payload is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Byte = 0x00,
    Fixed32 = 0x01,
    Fixed64 = 0x02,
    Bytes = 0x03,
}

impl WireType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(WireType::Byte),
            0x01 => Some(WireType::Fixed32),
            0x02 => Some(WireType::Fixed64),
            0x03 => Some(WireType::Bytes),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Byte => "BYTE",
            WireType::Fixed32 => "FIXED32",
            WireType::Fixed64 => "FIXED64",
            WireType::Bytes => "BYTES",
        };
        f.write_str(name)
    }
}

/// A record that encodes as a field-tagged table
pub trait Table: Sized {
    /// Table name used in log output
    const NAME: &'static str;

    /// Write every set field of `self`
    fn write_fields(&self, writer: &mut TableWriter);

    /// Rebuild a record from its fields, skipping unknown ids
    fn read_fields(fields: TableReader<'_>) -> Result<Self>;
}

/// Encode a record as a length-framed message
pub fn encode<T: Table>(value: &T) -> Vec<u8> {
    let mut writer = TableWriter::new();
    let frame = writer.begin_len();
    value.write_fields(&mut writer);
    writer.end_len(frame);
    writer.into_inner()
}

/// Decode a length-framed message
///
/// Fails with `TruncatedInput` if the frame is shorter than its prefix
/// announces and `TrailingBytes` if anything follows it.
pub fn decode<T: Table>(bytes: &[u8]) -> Result<T> {
    let body = decode_frame(bytes)?;
    T::read_fields(TableReader::new(body))
}

/// Log and ignore a field this version does not know about
pub fn skip_unknown(table: &'static str, field: &Field<'_>) {
    tracing::trace!(
        table,
        id = field.id,
        wire_type = %field.value.wire_type(),
        "skipping unknown field"
    );
}

/// Decode a nested table stored in a BYTES field
pub fn read_table<T: Table>(value: &FieldValue<'_>, name: &'static str) -> Result<T> {
    let fields = value.as_table(name)?;
    T::read_fields(fields).map_err(|e| e.in_field(name))
}

/// Decode a vector of tables, preserving element order
pub fn read_vector<T: Table>(value: &FieldValue<'_>, name: &'static str) -> Result<Vec<T>> {
    let elements = value.as_vector(name)?;
    let mut out = Vec::with_capacity(elements.len_hint());

    for (index, element) in elements.enumerate() {
        let body = element?;
        let item = T::read_fields(TableReader::new(body)).map_err(|e| e.at_index(name, index))?;
        out.push(item);
    }

    Ok(out)
}

pub(crate) fn unexpected_wire_type(name: &'static str, expected: WireType, found: WireType) -> CodecError {
    CodecError::UnexpectedWireType {
        location: Location::field(name),
        expected,
        found,
    }
}
