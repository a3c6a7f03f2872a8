//! WAL points
//!
//! A point is one timestamped value for one series key.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::{ScalarValue, UnionSlot};
use crate::wire::{self, skip_unknown, Table, TableReader, TableWriter};

const KEY: u8 = 0;
const TIME: u8 = 1;
const VALUE_TYPE: u8 = 2;
const VALUE: u8 = 3;

/// A single point in a WAL write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Series key; empty keys are legal on the wire
    pub key: String,

    /// Nanoseconds since the Unix epoch (negative before 1970)
    pub time: i64,

    pub value: ScalarValue,
}

impl Point {
    pub fn new(key: impl Into<String>, time: i64, value: impl Into<ScalarValue>) -> Self {
        Self {
            key: key.into(),
            time,
            value: value.into(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        wire::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }
}

impl Table for Point {
    const NAME: &'static str = "Point";

    fn write_fields(&self, writer: &mut TableWriter) {
        writer.write_str(KEY, &self.key);
        writer.write_i64(TIME, self.time);
        self.value.write_union(writer, VALUE_TYPE, VALUE);
    }

    fn read_fields(fields: TableReader<'_>) -> Result<Self> {
        let mut key = String::new();
        let mut time = 0;
        let mut value = UnionSlot::default();

        for field in fields {
            let field = field?;
            match field.id {
                KEY => key = field.value.as_str("key")?.to_owned(),
                TIME => time = field.value.as_i64("time")?,
                VALUE_TYPE => value.set_tag(&field.value, "value_type")?,
                VALUE => value.set_payload(field.value),
                _ => skip_unknown(Self::NAME, &field),
            }
        }

        let value = ScalarValue::from_union(value).map_err(|e| e.in_field("value"))?;
        Ok(Self { key, time, value })
    }
}
