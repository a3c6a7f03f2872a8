//! Value Tests
//!
//! Tests for scalar and column value encoding/decoding.

use delorean_wal::value::UNION_NONE;
use delorean_wal::wire::TableWriter;
use delorean_wal::{CodecError, ColumnType, ColumnValue, ScalarValue};

fn round_trip(value: &ScalarValue) -> ScalarValue {
    ScalarValue::decode(&value.encode()).unwrap()
}

// =============================================================================
// Scalar Value Tests
// =============================================================================

#[test]
fn test_scalar_integer_extremes() {
    for v in [i64::MIN, -1, 0, 1, i64::MAX] {
        assert_eq!(round_trip(&ScalarValue::I64(v)), ScalarValue::I64(v));
    }
    for v in [0, 1, u64::MAX] {
        assert_eq!(round_trip(&ScalarValue::U64(v)), ScalarValue::U64(v));
    }
}

#[test]
fn test_scalar_float_bits_preserved() {
    let nan_with_payload = f64::from_bits(0x7FF8_0000_DEAD_BEEF);
    let values = [
        0.0,
        -0.0,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::MIN_POSITIVE / 2.0,
        f64::MAX,
        nan_with_payload,
    ];

    for v in values {
        match round_trip(&ScalarValue::F64(v)) {
            ScalarValue::F64(decoded) => assert_eq!(decoded.to_bits(), v.to_bits()),
            other => panic!("Expected F64, got {:?}", other),
        }
    }
}

#[test]
fn test_scalar_nan_equals_itself() {
    let nan = ScalarValue::F64(f64::NAN);
    assert_eq!(nan, nan.clone());
    assert_ne!(ScalarValue::F64(0.0), ScalarValue::F64(-0.0));
}

#[test]
fn test_scalar_strings() {
    for s in ["", "cpu", "température", "日本語", "emoji 🦀"] {
        assert_eq!(round_trip(&ScalarValue::from(s)), ScalarValue::Str(s.to_string()));
    }
}

#[test]
fn test_scalar_bools() {
    assert_eq!(round_trip(&ScalarValue::Bool(true)), ScalarValue::Bool(true));
    assert_eq!(round_trip(&ScalarValue::Bool(false)), ScalarValue::Bool(false));
}

#[test]
fn test_scalar_none_discriminant_rejected() {
    let mut writer = TableWriter::new();
    writer.write_u8(0, UNION_NONE);
    let bytes = writer.into_frame();

    assert!(matches!(
        ScalarValue::decode(&bytes),
        Err(CodecError::MalformedUnion { .. })
    ));
}

#[test]
fn test_scalar_unknown_field_skipped() {
    let mut writer = TableWriter::new();
    writer.write_u8(0, 1);
    writer.write_str(7, "from a newer writer");
    writer.write_i64(1, -42);
    writer.write_u32(8, 99);
    let bytes = writer.into_frame();

    assert_eq!(ScalarValue::decode(&bytes).unwrap(), ScalarValue::I64(-42));
}

// =============================================================================
// Column Value Tests
// =============================================================================

#[test]
fn test_column_value_variants() {
    let values = vec![
        ColumnValue::Tag("host-a".to_string()),
        ColumnValue::I64(-7),
        ColumnValue::U64(7),
        ColumnValue::F64(0.64),
        ColumnValue::Bool(true),
        ColumnValue::Str("free text".to_string()),
    ];

    for value in values {
        let decoded = ColumnValue::decode(&value.encode()).unwrap();
        assert_eq!(decoded.column_type(), value.column_type());
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_tag_is_not_string() {
    let tag = ColumnValue::Tag("a".to_string());
    let string = ColumnValue::Str("a".to_string());

    assert_ne!(tag.encode(), string.encode());
    assert!(ColumnValue::decode(&tag.encode()).unwrap().is_tag());
    assert!(!ColumnValue::decode(&string.encode()).unwrap().is_tag());
}

#[test]
fn test_column_value_json() {
    let json = serde_json::to_string(&ColumnValue::Tag("a".to_string())).unwrap();
    assert_eq!(json, r#"{"Tag":"a"}"#);

    let back: ColumnValue = serde_json::from_str(r#"{"U64":5}"#).unwrap();
    assert_eq!(back, ColumnValue::U64(5));
}

// =============================================================================
// Column Type Tests
// =============================================================================

#[test]
fn test_column_type_ordinals_stable() {
    let expected = [
        ColumnType::I64,
        ColumnType::U64,
        ColumnType::F64,
        ColumnType::Tag,
        ColumnType::String,
        ColumnType::Bool,
    ];

    for (ordinal, column_type) in expected.iter().enumerate() {
        assert_eq!(ColumnType::try_from(ordinal as u8).unwrap(), *column_type);
        assert_eq!(*column_type as u8, ordinal as u8);
    }

    assert!(matches!(
        ColumnType::try_from(6u8),
        Err(CodecError::InvalidColumnType(6))
    ));
}
