//! Wire Writer
//!
//! Appends fields to a table body. Nested tables and vectors are written in
//! place with their length prefixes patched once the content is known.
//!
//! Lengths and counts are `u32` on the wire, so no single field, vector or
//! message may exceed [`MAX_WIRE_LEN`] bytes. Callers bound their inputs
//! (see `Config::max_payload_size`); debug builds assert the limit.

use super::{Table, WireType, LEN_PREFIX_SIZE};

/// Largest length or count a prefix can carry
pub const MAX_WIRE_LEN: usize = u32::MAX as usize;

/// Little-endian length prefix for `len`
///
/// Saturates at [`MAX_WIRE_LEN`]; a saturated prefix never matches its
/// content, so decoding the result fails instead of misreading it.
fn len_prefix(len: usize) -> [u8; LEN_PREFIX_SIZE] {
    debug_assert!(
        len <= MAX_WIRE_LEN,
        "length {} exceeds the 4 GiB wire limit",
        len
    );
    u32::try_from(len).unwrap_or(u32::MAX).to_le_bytes()
}

/// Builds one table body
#[derive(Debug, Default)]
pub struct TableWriter {
    buf: Vec<u8>,
}

impl TableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn key(&mut self, id: u8, wire_type: WireType) {
        self.buf.push(id);
        self.buf.push(wire_type as u8);
    }

    /// Reserve a length prefix, returning its position
    pub(crate) fn begin_len(&mut self) -> usize {
        let pos = self.buf.len();
        self.buf.extend_from_slice(&[0u8; LEN_PREFIX_SIZE]);
        pos
    }

    /// Patch the prefix reserved at `pos` with the bytes written since
    pub(crate) fn end_len(&mut self, pos: usize) {
        let prefix = len_prefix(self.buf.len() - pos - LEN_PREFIX_SIZE);
        self.buf[pos..pos + LEN_PREFIX_SIZE].copy_from_slice(&prefix);
    }

    // -------------------------------------------------------------------------
    // Scalars
    // -------------------------------------------------------------------------

    pub fn write_u8(&mut self, id: u8, value: u8) {
        self.key(id, WireType::Byte);
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, id: u8, value: bool) {
        self.write_u8(id, value as u8);
    }

    pub fn write_u32(&mut self, id: u8, value: u32) {
        self.key(id, WireType::Fixed32);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, id: u8, value: u64) {
        self.key(id, WireType::Fixed64);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, id: u8, value: i64) {
        self.write_u64(id, value as u64);
    }

    /// Written by bit pattern so NaN payloads survive
    pub fn write_f64(&mut self, id: u8, value: f64) {
        self.write_u64(id, value.to_bits());
    }

    // -------------------------------------------------------------------------
    // Length-delimited
    // -------------------------------------------------------------------------

    pub fn write_bytes(&mut self, id: u8, value: &[u8]) {
        self.key(id, WireType::Bytes);
        self.buf.extend_from_slice(&len_prefix(value.len()));
        self.buf.extend_from_slice(value);
    }

    pub fn write_str(&mut self, id: u8, value: &str) {
        self.write_bytes(id, value.as_bytes());
    }

    pub fn write_table<T: Table>(&mut self, id: u8, value: &T) {
        self.key(id, WireType::Bytes);
        let pos = self.begin_len();
        value.write_fields(self);
        self.end_len(pos);
    }

    pub fn write_vector<T: Table>(&mut self, id: u8, values: &[T]) {
        self.key(id, WireType::Bytes);
        let pos = self.begin_len();
        self.buf.extend_from_slice(&len_prefix(values.len()));

        for value in values {
            let element = self.begin_len();
            value.write_fields(self);
            self.end_len(element);
        }

        self.end_len(pos);
    }

    /// Write a vector whose element bodies are already encoded
    pub fn write_raw_vector(&mut self, id: u8, bodies: &[&[u8]]) {
        self.key(id, WireType::Bytes);
        let pos = self.begin_len();
        self.buf.extend_from_slice(&len_prefix(bodies.len()));

        for body in bodies {
            self.buf.extend_from_slice(&len_prefix(body.len()));
            self.buf.extend_from_slice(body);
        }

        self.end_len(pos);
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bare table body
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// The table body wrapped in a `len (4)` message frame
    pub fn into_frame(self) -> Vec<u8> {
        let mut framed = Vec::with_capacity(LEN_PREFIX_SIZE + self.buf.len());
        framed.extend_from_slice(&len_prefix(self.buf.len()));
        framed.extend_from_slice(&self.buf);
        framed
    }
}
