//! Point values
//!
//! The five-way union carried by every WAL point.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wire::{self, skip_unknown, FieldValue, Table, TableReader, TableWriter};

use super::{bool_from_byte, string_from_bytes, union_mismatch, ColumnType, UnionSlot};

// Discriminants
const I64: u8 = 1;
const U64: u8 = 2;
const F64: u8 = 3;
const BOOL: u8 = 4;
const STR: u8 = 5;

// Standalone table fields
const VALUE_TYPE: u8 = 0;
const VALUE: u8 = 1;

/// The value of a point
///
/// Equality compares floats by bit pattern, so a NaN equals an identical NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl ScalarValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ScalarValue::I64(_) => ColumnType::I64,
            ScalarValue::U64(_) => ColumnType::U64,
            ScalarValue::F64(_) => ColumnType::F64,
            ScalarValue::Bool(_) => ColumnType::Bool,
            ScalarValue::Str(_) => ColumnType::String,
        }
    }

    /// Encode as a standalone length-framed message
    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }

    /// Write discriminant and payload into the fields of a parent table
    pub(crate) fn write_union(&self, writer: &mut TableWriter, tag_id: u8, value_id: u8) {
        match self {
            ScalarValue::I64(v) => {
                writer.write_u8(tag_id, I64);
                writer.write_i64(value_id, *v);
            }
            ScalarValue::U64(v) => {
                writer.write_u8(tag_id, U64);
                writer.write_u64(value_id, *v);
            }
            ScalarValue::F64(v) => {
                writer.write_u8(tag_id, F64);
                writer.write_f64(value_id, *v);
            }
            ScalarValue::Bool(v) => {
                writer.write_u8(tag_id, BOOL);
                writer.write_bool(value_id, *v);
            }
            ScalarValue::Str(v) => {
                writer.write_u8(tag_id, STR);
                writer.write_str(value_id, v);
            }
        }
    }

    pub(crate) fn from_union(slot: UnionSlot<'_>) -> Result<Self> {
        let (tag, payload) = slot.resolve()?;

        match (tag, payload) {
            (I64, FieldValue::Fixed64(v)) => Ok(ScalarValue::I64(v as i64)),
            (U64, FieldValue::Fixed64(v)) => Ok(ScalarValue::U64(v)),
            (F64, FieldValue::Fixed64(v)) => Ok(ScalarValue::F64(f64::from_bits(v))),
            (BOOL, FieldValue::Byte(b)) => bool_from_byte(b).map(ScalarValue::Bool),
            (STR, FieldValue::Bytes(b)) => string_from_bytes(b).map(ScalarValue::Str),
            (tag, payload) => Err(union_mismatch(tag, STR, &payload)),
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::I64(a), ScalarValue::I64(b)) => a == b,
            (ScalarValue::U64(a), ScalarValue::U64(b)) => a == b,
            (ScalarValue::F64(a), ScalarValue::F64(b)) => a.to_bits() == b.to_bits(),
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a == b,
            (ScalarValue::Str(a), ScalarValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Table for ScalarValue {
    const NAME: &'static str = "ScalarValue";

    fn write_fields(&self, writer: &mut TableWriter) {
        self.write_union(writer, VALUE_TYPE, VALUE);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut slot = UnionSlot::default();

        for field in fields {
            let field = field?;
            match field.id {
                VALUE_TYPE => slot.set_tag(&field.value, "value_type")?,
                VALUE => slot.set_payload(field.value),
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        ScalarValue::from_union(slot).map_err(|e| e.in_field("value"))
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::I64(v)
    }
}

impl From<u64> for ScalarValue {
    fn from(v: u64) -> Self {
        ScalarValue::U64(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::F64(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    fn framed(build: impl FnOnce(&mut TableWriter)) -> Vec<u8> {
        let mut writer = TableWriter::new();
        build(&mut writer);
        writer.into_frame()
    }

    #[test]
    fn test_no_coercion_between_variants() {
        let bytes = ScalarValue::I64(1).encode();
        let decoded = ScalarValue::decode(&bytes).unwrap();
        assert_ne!(decoded, ScalarValue::F64(1.0));
        assert_ne!(decoded, ScalarValue::U64(1));
        assert_eq!(decoded, ScalarValue::I64(1));
    }

    #[test]
    fn test_unknown_discriminant() {
        let bytes = framed(|w| {
            w.write_u8(VALUE_TYPE, 9);
            w.write_u64(VALUE, 0);
        });

        match ScalarValue::decode(&bytes) {
            Err(CodecError::MalformedUnion { location, detail }) => {
                assert_eq!(location.to_string(), "value");
                assert!(detail.contains("unknown discriminant 9"));
            }
            other => panic!("Expected MalformedUnion, got {:?}", other),
        }
    }

    #[test]
    fn test_discriminant_payload_mismatch() {
        let bytes = framed(|w| {
            w.write_u8(VALUE_TYPE, I64);
            w.write_str(VALUE, "not a number");
        });

        assert!(matches!(
            ScalarValue::decode(&bytes),
            Err(CodecError::MalformedUnion { .. })
        ));
    }

    #[test]
    fn test_bool_byte_out_of_range() {
        let bytes = framed(|w| {
            w.write_u8(VALUE_TYPE, BOOL);
            w.write_u8(VALUE, 2);
        });

        assert!(matches!(
            ScalarValue::decode(&bytes),
            Err(CodecError::MalformedUnion { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_not_replaced() {
        let bytes = framed(|w| {
            w.write_u8(VALUE_TYPE, STR);
            w.write_bytes(VALUE, &[b'o', b'k', 0xC3]);
        });

        match ScalarValue::decode(&bytes) {
            Err(CodecError::InvalidUtf8 { location, .. }) => {
                assert_eq!(location.to_string(), "value");
            }
            other => panic!("Expected InvalidUtf8, got {:?}", other),
        }
    }

    #[test]
    fn test_column_types() {
        assert_eq!(ScalarValue::from(1i64).column_type(), ColumnType::I64);
        assert_eq!(ScalarValue::from(1u64).column_type(), ColumnType::U64);
        assert_eq!(ScalarValue::from(1.5).column_type(), ColumnType::F64);
        assert_eq!(ScalarValue::from(true).column_type(), ColumnType::Bool);
        assert_eq!(ScalarValue::from("s").column_type(), ColumnType::String);
    }
}
