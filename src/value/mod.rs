//! Value Module
//!
//! Tagged-union values carried by points and rows.
//!
//! ## Union Encoding
//! A union occupies two fields of its parent table: a BYTE discriminant and a
//! payload whose wire type is fixed by the discriminant.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ Discriminant (BYTE)  │ Payload (FIXED64/BYTE/BYTES) │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//!
//! Discriminant 0 is reserved for "no value" and is never valid where a
//! value is required.

mod column;
mod scalar;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::wire::FieldValue;

pub use column::ColumnValue;
pub use scalar::ScalarValue;

/// Reserved discriminant meaning "no value present"
pub const UNION_NONE: u8 = 0;

/// Column types, with ordinals fixed by the on-disk format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColumnType {
    I64 = 0,
    U64 = 1,
    F64 = 2,
    Tag = 3,
    String = 4,
    Bool = 5,
}

impl TryFrom<u8> for ColumnType {
    type Error = CodecError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(ColumnType::I64),
            1 => Ok(ColumnType::U64),
            2 => Ok(ColumnType::F64),
            3 => Ok(ColumnType::Tag),
            4 => Ok(ColumnType::String),
            5 => Ok(ColumnType::Bool),
            other => Err(CodecError::InvalidColumnType(other)),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::I64 => "i64",
            ColumnType::U64 => "u64",
            ColumnType::F64 => "f64",
            ColumnType::Tag => "tag",
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Union decoding helpers
// =============================================================================

/// Collects the discriminant and payload of a union while a table is read
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct UnionSlot<'a> {
    tag: Option<u8>,
    payload: Option<FieldValue<'a>>,
}

impl<'a> UnionSlot<'a> {
    pub(crate) fn set_tag(&mut self, value: &FieldValue<'a>, name: &'static str) -> Result<()> {
        self.tag = Some(value.as_u8(name)?);
        Ok(())
    }

    pub(crate) fn set_payload(&mut self, value: FieldValue<'a>) {
        self.payload = Some(value);
    }

    /// Both halves of the union, or `MalformedUnion` if either is missing
    pub(crate) fn resolve(self) -> Result<(u8, FieldValue<'a>)> {
        match (self.tag, self.payload) {
            (Some(UNION_NONE), Some(_)) => Err(CodecError::malformed_union(
                "payload present with the none discriminant",
            )),
            (Some(tag), Some(payload)) => Ok((tag, payload)),
            (Some(tag), None) => Err(CodecError::malformed_union(format!(
                "discriminant {} has no payload",
                tag
            ))),
            (None, Some(payload)) => Err(CodecError::malformed_union(format!(
                "{} payload has no discriminant",
                payload.wire_type()
            ))),
            (None, None) => Err(CodecError::malformed_union("value is missing")),
        }
    }
}

/// Discriminant and payload disagree, or the discriminant is unknown
pub(crate) fn union_mismatch(tag: u8, max_tag: u8, payload: &FieldValue<'_>) -> CodecError {
    if tag == UNION_NONE || tag > max_tag {
        CodecError::malformed_union(format!("unknown discriminant {}", tag))
    } else {
        CodecError::malformed_union(format!(
            "discriminant {} does not match {} payload",
            tag,
            payload.wire_type()
        ))
    }
}

pub(crate) fn bool_from_byte(byte: u8) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::malformed_union(format!(
            "bool payload 0x{:02x} is neither 0 nor 1",
            other
        ))),
    }
}

pub(crate) fn string_from_bytes(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|source| CodecError::InvalidUtf8 {
            location: crate::error::Location::root(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_ordinals() {
        assert_eq!(ColumnType::I64 as u8, 0);
        assert_eq!(ColumnType::U64 as u8, 1);
        assert_eq!(ColumnType::F64 as u8, 2);
        assert_eq!(ColumnType::Tag as u8, 3);
        assert_eq!(ColumnType::String as u8, 4);
        assert_eq!(ColumnType::Bool as u8, 5);
    }

    #[test]
    fn test_column_type_from_byte() {
        for byte in 0u8..=5 {
            let column_type = ColumnType::try_from(byte).unwrap();
            assert_eq!(column_type as u8, byte);
        }
        assert!(matches!(
            ColumnType::try_from(6),
            Err(CodecError::InvalidColumnType(6))
        ));
    }

    #[test]
    fn test_union_slot_missing_halves() {
        let mut slot = UnionSlot::default();
        assert!(matches!(slot.resolve(), Err(CodecError::MalformedUnion { .. })));

        slot.set_tag(&FieldValue::Byte(1), "value_type").unwrap();
        assert!(matches!(slot.resolve(), Err(CodecError::MalformedUnion { .. })));

        let mut slot = UnionSlot::default();
        slot.set_payload(FieldValue::Fixed64(1));
        assert!(matches!(slot.resolve(), Err(CodecError::MalformedUnion { .. })));
    }

    #[test]
    fn test_union_slot_none_with_payload() {
        let mut slot = UnionSlot::default();
        slot.set_tag(&FieldValue::Byte(UNION_NONE), "value_type").unwrap();
        slot.set_payload(FieldValue::Fixed64(1));
        assert!(matches!(slot.resolve(), Err(CodecError::MalformedUnion { .. })));
    }

    #[test]
    fn test_bool_bytes() {
        assert!(!bool_from_byte(0).unwrap());
        assert!(bool_from_byte(1).unwrap());
        assert!(matches!(
            bool_from_byte(2),
            Err(CodecError::MalformedUnion { .. })
        ));
    }
}
