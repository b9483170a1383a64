//! CSV parsing into typed records.

use std::collections::BTreeSet;

use csv::{ReaderBuilder, StringRecordsIntoIter};
use tracing::{debug, warn};

use sales_model::{ParseDiagnostic, RawRow, Record, Schema, Value};

use crate::coerce::coerce_value;
use crate::error::{CodecError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Lazy stream of records read from CSV text.
///
/// The stream is finite and cannot be restarted; call [`parse`] again to
/// re-read from the start of the text.
pub struct Records<'a> {
    schema: &'a Schema,
    rows: StringRecordsIntoIter<&'a [u8]>,
    headers: Vec<String>,
    next_index: usize,
}

impl std::fmt::Debug for Records<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Records")
            .field("headers", &self.headers)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl Records<'_> {
    fn raw_row(&self, cells: &[String]) -> RawRow {
        self.headers
            .iter()
            .zip(cells)
            .map(|(header, cell)| (header.clone(), cell.clone()))
            .collect()
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(error) => return Some(Err(CodecError::Csv(error))),
            };
            let cells: Vec<String> = row.iter().map(normalize_cell).collect();
            // Whitespace-only line. Delimited rows of empty cells are records.
            if cells.len() == 1 && cells[0].is_empty() {
                continue;
            }
            let index = self.next_index;
            self.next_index += 1;

            let mut diagnostics = Vec::new();
            if cells.len() != self.headers.len() {
                warn!(
                    row_index = index,
                    expected = self.headers.len(),
                    found = cells.len(),
                    "row has unexpected column count"
                );
                diagnostics.push(ParseDiagnostic::ColumnCount {
                    expected: self.headers.len(),
                    found: cells.len(),
                });
            }
            let raw = self.raw_row(&cells);
            return Some(Ok(record_from_raw(index, &raw, self.schema, diagnostics)));
        }
    }
}

/// Build a typed record from one raw row.
///
/// Fields absent from the row are Null; cells that cannot be coerced are Null
/// with a [`ParseDiagnostic::Coercion`] entry.
pub fn record_from_raw(
    index: usize,
    raw: &RawRow,
    schema: &Schema,
    mut diagnostics: Vec<ParseDiagnostic>,
) -> Record {
    let mut values = std::collections::BTreeMap::new();
    for field in schema.fields() {
        let value = match raw.get(&field.name) {
            Some(text) => match coerce_value(text, field.field_type) {
                Some(value) => value,
                None => {
                    debug!(
                        row_index = index,
                        field = %field.name,
                        expected = %field.field_type,
                        "value could not be coerced"
                    );
                    diagnostics.push(ParseDiagnostic::Coercion {
                        field: field.name.clone(),
                        raw: text.trim().to_string(),
                        expected: field.field_type,
                    });
                    Value::Null
                }
            },
            None => Value::Null,
        };
        values.insert(field.name.clone(), value);
    }
    Record::new(index, values, diagnostics)
}

/// Parse CSV text into a lazy stream of records.
///
/// The header is read eagerly: empty input and missing required columns are
/// reported here. Columns the schema does not declare are ignored.
pub fn parse<'a>(raw_text: &'a str, schema: &'a Schema) -> Result<Records<'a>> {
    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw_text.as_bytes())
        .into_records();

    let mut headers = None;
    for row in rows.by_ref() {
        let row = row?;
        let normalized: Vec<String> = row.iter().map(normalize_header).collect();
        if normalized.iter().all(String::is_empty) {
            continue;
        }
        headers = Some(normalized);
        break;
    }
    let headers = headers.ok_or(CodecError::EmptyInput)?;

    let present: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let missing: Vec<String> = schema
        .required_fields()
        .filter(|field| !present.contains(field.name.as_str()))
        .map(|field| field.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(CodecError::MissingColumns { columns: missing });
    }

    for header in &headers {
        if !schema.contains(header) {
            warn!(column = %header, "ignoring column not declared in schema");
        }
    }
    for field in schema.fields() {
        if !present.contains(field.name.as_str()) {
            debug!(field = %field.name, "optional column absent; values will be null");
        }
    }

    Ok(Records {
        schema,
        rows,
        headers,
        next_index: 0,
    })
}

/// Parse the whole text, failing on the first structural error.
pub fn parse_all(raw_text: &str, schema: &Schema) -> Result<Vec<Record>> {
    parse(raw_text, schema)?.collect()
}

#[cfg(test)]
mod tests {
    use sales_model::fields;

    use super::*;

    const HEADER: &str = "ORDERNUMBER,ORDERLINENUMBER,QUANTITYORDERED,PRICEEACH,SALES,ORDERDATE,STATUS,PRODUCTCODE,PRODUCTLINE,NUMERICCODE,COUNTRY,CITY";

    #[test]
    fn parses_typed_values() {
        let schema = Schema::sales();
        let text = format!(
            "{HEADER}\n10107,2,30,95.70,2871.00,2/24/2003 0:00,Shipped,S10_1678,Motorcycles,10,USA,NYC\n"
        );
        let records = parse_all(&text, &schema).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.index(), 0);
        assert_eq!(record.get(fields::ORDERNUMBER), &Value::Integer(10107));
        assert_eq!(
            record.get(fields::SALES).render().as_deref(),
            Some("2871.00")
        );
        assert_eq!(
            record.get(fields::ORDERDATE).render().as_deref(),
            Some("2003-02-24 00:00:00")
        );
        assert!(record.diagnostics().is_empty());
    }

    #[test]
    fn coercion_failures_become_null_with_diagnostic() {
        let schema = Schema::sales();
        let text = format!("{HEADER}\nORDX,1,5,abc,100,1/2/2019,,S1,Cars,42,Peru,Lima\n");
        let records = parse_all(&text, &schema).unwrap();
        let record = &records[0];
        assert!(record.get(fields::ORDERNUMBER).is_null());
        assert_eq!(record.coercion_failure(fields::ORDERNUMBER), Some("ORDX"));
        assert_eq!(record.coercion_failure(fields::PRICEEACH), Some("abc"));
        assert!(record.is_missing(fields::STATUS));
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let schema = Schema::sales();
        let text = format!("{HEADER}\n10107,2,30\n");
        let records = parse_all(&text, &schema).unwrap();
        let record = &records[0];
        assert!(record.is_malformed());
        assert_eq!(record.get(fields::QUANTITYORDERED), &Value::Integer(30));
        assert!(record.is_missing(fields::SALES));
        assert!(record.is_missing(fields::CITY));
    }

    #[test]
    fn blank_lines_do_not_consume_indices() {
        let schema = Schema::sales();
        let text = format!("\n{HEADER}\n1,1,1,1,1,1/1/2020,,A,B,1,C,D\n\n   \n2,1,1,1,1,1/1/2020,,A,B,1,C,D\n");
        let records = parse_all(&text, &schema).unwrap();
        let indices: Vec<usize> = records.iter().map(Record::index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn rows_of_empty_cells_become_null_records() {
        let schema = Schema::sales();
        let text = format!("{HEADER}\n1,1,1,1,1,1/1/2020,,A,B,1,C,D\n,,,,,,,,,,,\n2,1,1,1,1,1/1/2020,,A,B,1,C,D\n");
        let records = parse_all(&text, &schema).unwrap();
        let indices: Vec<usize> = records.iter().map(Record::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let empty = &records[1];
        assert!(empty.values().values().all(Value::is_null));
        assert!(empty.diagnostics().is_empty());
    }

    #[test]
    fn empty_input_is_fatal() {
        let schema = Schema::sales();
        let err = parse("", &schema).unwrap_err();
        assert!(matches!(err, CodecError::EmptyInput));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let schema = Schema::sales();
        let err = parse("ORDERNUMBER,CITY\n1,Lima\n", &schema).unwrap_err();
        match err {
            CodecError::MissingColumns { columns } => {
                assert!(columns.contains(&"SALES".to_string()));
                assert!(!columns.contains(&"CITY".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reparse_starts_from_the_beginning() {
        let schema = Schema::sales();
        let text = format!("{HEADER}\n1,1,1,1,1,1/1/2020,,A,B,1,C,D\n");
        let mut first = parse(&text, &schema).unwrap();
        assert!(first.next().is_some());
        assert!(first.next().is_none());
        let second = parse(&text, &schema).unwrap();
        assert_eq!(second.count(), 1);
    }
}
