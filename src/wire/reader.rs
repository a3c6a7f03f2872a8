//! Wire Reader
//!
//! Bounds-checked cursors over encoded tables. Nothing here panics on
//! malformed input; every short read surfaces as `TruncatedInput`.

use crate::error::{CodecError, Location, Result};

use super::{unexpected_wire_type, WireType, LEN_PREFIX_SIZE};

// =============================================================================
// Byte Cursor
// =============================================================================

/// Little-endian cursor over a borrowed buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(CodecError::truncated(n, available));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read a `len (4)` prefix followed by that many bytes
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }
}

/// Strip the outer `len (4)` frame of a message, returning its body
pub fn decode_frame(bytes: &[u8]) -> Result<&[u8]> {
    let mut reader = ByteReader::new(bytes);
    let body = reader.read_len_prefixed()?;

    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            location: Location::root(),
            remaining: reader.remaining(),
        });
    }

    Ok(body)
}

// =============================================================================
// Fields
// =============================================================================

/// A decoded field payload, borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Byte(u8),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(&'a [u8]),
}

/// One `id + wire type + payload` field of a table
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub id: u8,
    pub value: FieldValue<'a>,
}

impl<'a> FieldValue<'a> {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Byte(_) => WireType::Byte,
            FieldValue::Fixed32(_) => WireType::Fixed32,
            FieldValue::Fixed64(_) => WireType::Fixed64,
            FieldValue::Bytes(_) => WireType::Bytes,
        }
    }

    pub fn as_u8(&self, name: &'static str) -> Result<u8> {
        match self {
            FieldValue::Byte(v) => Ok(*v),
            other => Err(unexpected_wire_type(name, WireType::Byte, other.wire_type())),
        }
    }

    pub fn as_u32(&self, name: &'static str) -> Result<u32> {
        match self {
            FieldValue::Fixed32(v) => Ok(*v),
            other => Err(unexpected_wire_type(name, WireType::Fixed32, other.wire_type())),
        }
    }

    pub fn as_u64(&self, name: &'static str) -> Result<u64> {
        match self {
            FieldValue::Fixed64(v) => Ok(*v),
            other => Err(unexpected_wire_type(name, WireType::Fixed64, other.wire_type())),
        }
    }

    pub fn as_i64(&self, name: &'static str) -> Result<i64> {
        self.as_u64(name).map(|v| v as i64)
    }

    pub fn as_bytes(&self, name: &'static str) -> Result<&'a [u8]> {
        match self {
            FieldValue::Bytes(v) => Ok(v),
            other => Err(unexpected_wire_type(name, WireType::Bytes, other.wire_type())),
        }
    }

    /// Borrow a string field, rejecting invalid UTF-8
    pub fn as_str(&self, name: &'static str) -> Result<&'a str> {
        let bytes = self.as_bytes(name)?;
        std::str::from_utf8(bytes).map_err(|source| CodecError::InvalidUtf8 {
            location: Location::field(name),
            source,
        })
    }

    pub fn as_table(&self, name: &'static str) -> Result<TableReader<'a>> {
        self.as_bytes(name).map(TableReader::new)
    }

    pub fn as_vector(&self, name: &'static str) -> Result<VectorReader<'a>> {
        let bytes = self.as_bytes(name)?;
        VectorReader::new(name, bytes)
    }
}

// =============================================================================
// Table Reader
// =============================================================================

/// Iterates the fields of one table body
///
/// Stops after the first error; the remaining bytes cannot be trusted.
#[derive(Debug, Clone)]
pub struct TableReader<'a> {
    bytes: ByteReader<'a>,
    failed: bool,
}

impl<'a> TableReader<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            bytes: ByteReader::new(body),
            failed: false,
        }
    }

    fn read_field(&mut self) -> Result<Field<'a>> {
        let id = self.bytes.read_u8()?;
        let wire_type = self.bytes.read_u8()?;

        let value = match WireType::from_u8(wire_type) {
            Some(WireType::Byte) => FieldValue::Byte(self.bytes.read_u8()?),
            Some(WireType::Fixed32) => FieldValue::Fixed32(self.bytes.read_u32()?),
            Some(WireType::Fixed64) => FieldValue::Fixed64(self.bytes.read_u64()?),
            Some(WireType::Bytes) => FieldValue::Bytes(self.bytes.read_len_prefixed()?),
            None => {
                return Err(CodecError::UnknownWireType {
                    location: Location::root(),
                    wire_type,
                })
            }
        };

        Ok(Field { id, value })
    }
}

impl<'a> Iterator for TableReader<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.bytes.is_empty() {
            return None;
        }

        let field = self.read_field();
        if field.is_err() {
            self.failed = true;
        }
        Some(field)
    }
}

// =============================================================================
// Vector Reader
// =============================================================================

/// Iterates the element bodies of a vector field, in order
///
/// Errors are already located at `name[index]` (or `name` for a bad count
/// or trailing bytes).
#[derive(Debug, Clone)]
pub struct VectorReader<'a> {
    name: &'static str,
    bytes: ByteReader<'a>,
    count: usize,
    index: usize,
    failed: bool,
}

impl<'a> VectorReader<'a> {
    fn new(name: &'static str, payload: &'a [u8]) -> Result<Self> {
        let mut bytes = ByteReader::new(payload);
        let count = bytes.read_u32().map_err(|e| e.in_field(name))? as usize;

        Ok(Self {
            name,
            bytes,
            count,
            index: 0,
            failed: false,
        })
    }

    /// Number of elements the vector declares
    pub fn declared_len(&self) -> usize {
        self.count
    }

    /// Capacity hint bounded by what the remaining bytes could hold
    pub fn len_hint(&self) -> usize {
        self.count.min(self.bytes.remaining() / LEN_PREFIX_SIZE)
    }
}

impl<'a> Iterator for VectorReader<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.index == self.count {
            if self.bytes.is_empty() {
                return None;
            }
            self.failed = true;
            return Some(Err(CodecError::TrailingBytes {
                location: Location::field(self.name),
                remaining: self.bytes.remaining(),
            }));
        }

        let index = self.index;
        self.index += 1;

        match self.bytes.read_len_prefixed() {
            Ok(body) => Some(Ok(body)),
            Err(e) => {
                self.failed = true;
                Some(Err(e.at_index(self.name, index)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        // +1 for a possible trailing-bytes error
        (0, Some((self.count - self.index).saturating_add(1)))
    }
}
