//! Column values
//!
//! The six-way union carried by row values. Identical to [`ScalarValue`]
//! apart from the `Tag` variant used for indexed dimension columns.
//!
//! [`ScalarValue`]: super::ScalarValue

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wire::{self, skip_unknown, FieldValue, Table, TableReader, TableWriter};

use super::{bool_from_byte, string_from_bytes, union_mismatch, ColumnType, UnionSlot};

const TAG: u8 = 1;
const I64: u8 = 2;
const U64: u8 = 3;
const F64: u8 = 4;
const BOOL: u8 = 5;
const STR: u8 = 6;

const VALUE_TYPE: u8 = 0;
const VALUE: u8 = 1;

/// The value of one column in a row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnValue {
    Tag(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl ColumnValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValue::Tag(_) => ColumnType::Tag,
            ColumnValue::I64(_) => ColumnType::I64,
            ColumnValue::U64(_) => ColumnType::U64,
            ColumnValue::F64(_) => ColumnType::F64,
            ColumnValue::Bool(_) => ColumnType::Bool,
            ColumnValue::Str(_) => ColumnType::String,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, ColumnValue::Tag(_))
    }

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }

    pub(crate) fn write_union(&self, writer: &mut TableWriter, tag_id: u8, value_id: u8) {
        match self {
            ColumnValue::Tag(v) => {
                writer.write_u8(tag_id, TAG);
                writer.write_str(value_id, v);
            }
            ColumnValue::I64(v) => {
                writer.write_u8(tag_id, I64);
                writer.write_i64(value_id, *v);
            }
            ColumnValue::U64(v) => {
                writer.write_u8(tag_id, U64);
                writer.write_u64(value_id, *v);
            }
            ColumnValue::F64(v) => {
                writer.write_u8(tag_id, F64);
                writer.write_f64(value_id, *v);
            }
            ColumnValue::Bool(v) => {
                writer.write_u8(tag_id, BOOL);
                writer.write_bool(value_id, *v);
            }
            ColumnValue::Str(v) => {
                writer.write_u8(tag_id, STR);
                writer.write_str(value_id, v);
            }
        }
    }

    pub(crate) fn from_union(slot: UnionSlot<'_>) -> Result<Self> {
        let (tag, payload) = slot.resolve()?;

        match (tag, payload) {
            (TAG, FieldValue::Bytes(b)) => string_from_bytes(b).map(ColumnValue::Tag),
            (I64, FieldValue::Fixed64(v)) => Ok(ColumnValue::I64(v as i64)),
            (U64, FieldValue::Fixed64(v)) => Ok(ColumnValue::U64(v)),
            (F64, FieldValue::Fixed64(v)) => Ok(ColumnValue::F64(f64::from_bits(v))),
            (BOOL, FieldValue::Byte(b)) => bool_from_byte(b).map(ColumnValue::Bool),
            (STR, FieldValue::Bytes(b)) => string_from_bytes(b).map(ColumnValue::Str),
            (tag, payload) => Err(union_mismatch(tag, STR, &payload)),
        }
    }
}

impl PartialEq for ColumnValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ColumnValue::Tag(a), ColumnValue::Tag(b)) => a == b,
            (ColumnValue::I64(a), ColumnValue::I64(b)) => a == b,
            (ColumnValue::U64(a), ColumnValue::U64(b)) => a == b,
            (ColumnValue::F64(a), ColumnValue::F64(b)) => a.to_bits() == b.to_bits(),
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a == b,
            (ColumnValue::Str(a), ColumnValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Table for ColumnValue {
    const NAME: &'static str = "ColumnValue";

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

        ColumnValue::from_union(slot).map_err(|e| e.in_field("value"))
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::I64(v)
    }
}

impl From<u64> for ColumnValue {
    fn from(v: u64) -> Self {
        ColumnValue::U64(v)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::F64(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}
