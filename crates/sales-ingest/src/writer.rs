//! Serialization of cleaned records.
//!
//! JSON output is an array of objects whose keys follow schema order. Every
//! key is always present: Null renders as JSON `null`. Decimals are written
//! as JSON numbers with exactly the digits of their decimal representation,
//! so `100.00` stays `100.00`. Dates render as `YYYY-MM-DD HH:MM:SS` strings.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use sales_model::{DATE_OUTPUT_FORMAT, Record, Schema, Value};

use crate::error::Result;

struct ValueView<'a>(&'a Value);

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => {
                let number = RawValue::from_string(value.to_string()).map_err(S::Error::custom)?;
                number.serialize(serializer)
            }
            Value::Text(text) => serializer.serialize_str(text),
            Value::Date(value) => {
                serializer.collect_str(&value.format(DATE_OUTPUT_FORMAT))
            }
            Value::Boolean(value) => serializer.serialize_bool(*value),
        }
    }
}

struct RecordView<'a> {
    schema: &'a Schema,
    record: &'a Record,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for name in self.schema.names() {
            map.serialize_entry(name, &ValueView(self.record.get(name)))?;
        }
        map.end()
    }
}

struct RecordsView<'a> {
    schema: &'a Schema,
    records: &'a [Record],
}

impl Serialize for RecordsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in self.records {
            seq.serialize_element(&RecordView {
                schema: self.schema,
                record,
            })?;
        }
        seq.end()
    }
}

/// Serialize records to a pretty-printed JSON array.
pub fn serialize_json(records: &[Record], schema: &Schema) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    serde_json::to_writer_pretty(&mut buffer, &RecordsView { schema, records })?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Serialize records to CSV with a schema-ordered header; Null is an empty cell.
pub fn serialize_csv(records: &[Record], schema: &Schema) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(schema.names())?;
    for record in records {
        let row: Vec<String> = schema
            .names()
            .map(|name| record.get(name).render().unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|error| error.into_error().into())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use sales_model::{FieldDef, FieldType};

    use super::*;

    fn small_schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("ID", FieldType::Integer, true),
            FieldDef::new("PRICE", FieldType::Decimal, true),
            FieldDef::new("NAME", FieldType::Text, false),
        ])
        .unwrap()
    }

    #[test]
    fn json_keeps_schema_order_and_decimal_digits() {
        let schema = small_schema();
        let record = Record::from_values(
            0,
            [
                ("NAME", Value::text("Lima")),
                ("PRICE", Value::Decimal(Decimal::from_str("100.00").unwrap())),
                ("ID", Value::Integer(7)),
            ],
        );
        let json = String::from_utf8(serialize_json(&[record], &schema).unwrap()).unwrap();
        insta::assert_snapshot!(json.trim_end(), @r#"
        [
          {
            "ID": 7,
            "PRICE": 100.00,
            "NAME": "Lima"
          }
        ]
        "#);
    }

    #[test]
    fn json_renders_null_for_absent_values() {
        let schema = small_schema();
        let record = Record::from_values(0, [("ID", Value::Integer(1))]);
        let json = String::from_utf8(serialize_json(&[record], &schema).unwrap()).unwrap();
        assert!(json.contains("\"PRICE\": null"));
        assert!(json.contains("\"NAME\": null"));
    }

    #[test]
    fn empty_output_is_an_empty_array() {
        let schema = small_schema();
        let json = serialize_json(&[], &schema).unwrap();
        assert_eq!(json, b"[]\n");
    }

    #[test]
    fn csv_writes_empty_cells_for_null() {
        let schema = small_schema();
        let record = Record::from_values(0, [("ID", Value::Integer(1))]);
        let csv = String::from_utf8(serialize_csv(&[record], &schema).unwrap()).unwrap();
        assert_eq!(csv, "ID,PRICE,NAME\n1,,\n");
    }
}
