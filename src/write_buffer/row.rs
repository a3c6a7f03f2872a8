//! Rows and table batches
//!
//! Rows are ordered lists of column values, never maps: a producer may repeat
//! a column name within one row and the decoder hands back exactly what was
//! written.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::{ColumnValue, UnionSlot};
use crate::wire::{self, read_vector, skip_unknown, Table, TableReader, TableWriter};

// Value fields
const COLUMN: u8 = 0;
const VALUE_TYPE: u8 = 1;
const VALUE: u8 = 2;

// Row fields
const VALUES: u8 = 0;

// TableWriteBatch fields
const TABLE_NAME: u8 = 0;
const ROWS: u8 = 1;

/// One named column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub column: String,
    pub value: ColumnValue,
}

/// An ordered sequence of column values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Rows destined for one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableWriteBatch {
    pub name: String,
    pub rows: Vec<Row>,
}

// =============================================================================
// Value
// =============================================================================

impl Value {
    pub fn new(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn tag(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, ColumnValue::Tag(value.into()))
    }
}

impl Table for Value {
    const NAME: &'static str = "Value";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(COLUMN, &self.column);
        self.value.write_union(writer, VALUE_TYPE, VALUE);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut column = String::new();
        let mut value = UnionSlot::default();

        for field in fields {
            let field = field?;
            match field.id {
                COLUMN => column = field.value.as_str("column")?.to_owned(),
                VALUE_TYPE => value.set_tag(&field.value, "value_type")?,
                VALUE => value.set_payload(field.value),
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        let value = ColumnValue::from_union(value).map_err(|e| e.in_field("value"))?;
        Ok(Self { column, value })
    }
}

// =============================================================================
// Row
// =============================================================================

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Append a column value, keeping any earlier value of the same column
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.values.push(Value::new(column, value));
        self
    }

    /// Append a tag column value
    pub fn with_tag(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(Value::tag(column, value));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Table for Row {
    const NAME: &'static str = "Row";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_vector(VALUES, &self.values);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut values = Vec::new();

        for field in fields {
            let field = field?;
            match field.id {
                VALUES => values = read_vector(&field.value, "values")?,
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        Ok(Self { values })
    }
}

// =============================================================================
// TableWriteBatch
// =============================================================================

impl TableWriteBatch {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }
}

impl Table for TableWriteBatch {
    const NAME: &'static str = "TableWriteBatch";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(TABLE_NAME, &self.name);
        writer.write_vector(ROWS, &self.rows);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut batch = TableWriteBatch::default();

        for field in fields {
            let field = field?;
            match field.id {
                TABLE_NAME => batch.name = field.value.as_str("name")?.to_owned(),
                ROWS => batch.rows = read_vector(&field.value, "rows")?,
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_row_builder_keeps_duplicates() {
        let row = Row::default()
            .with("a", 1i64)
            .with_tag("b", "x")
            .with("a", 2i64);

        assert_eq!(row.len(), 3);
        assert_eq!(row.values[0].column, "a");
        assert_eq!(row.values[2].column, "a");
        assert_eq!(row.values[2].value, ColumnValue::I64(2));
    }

    #[test]
    fn test_error_carries_row_and_column_index() {
        let mut bad_value = TableWriter::new();
        bad_value.write_str(COLUMN, "usage");
        bad_value.write_u8(VALUE_TYPE, 4);
        bad_value.write_bytes(VALUE, &[0xff]);
        let bad_value = bad_value.into_inner();

        let good_value = wire::encode(&Value::tag("host", "a"));

        let mut row = TableWriter::new();
        row.write_raw_vector(VALUES, &[&good_value[4..], bad_value.as_slice()]);
        let row = row.into_inner();

        let good_row = wire::encode(&Row::default().with("x", 1u64));

        let mut batch = TableWriter::new();
        batch.write_str(TABLE_NAME, "cpu");
        batch.write_raw_vector(ROWS, &[&good_row[4..], &good_row[4..], row.as_slice()]);
        let bytes = batch.into_frame();

        match TableWriteBatch::decode(&bytes) {
            Err(CodecError::MalformedUnion { location, .. }) => {
                assert_eq!(location.to_string(), "rows[2].values[1].value");
            }
            other => panic!("Expected MalformedUnion, got {:?}", other),
        }
    }
}
