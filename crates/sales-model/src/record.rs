//! Typed, immutable sales records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::FieldType;
use crate::value::Value;

static NULL: Value = Value::Null;

/// Mapping of column name to raw cell text for one CSV line.
pub type RawRow = BTreeMap<String, String>;

/// Something noticed while building a record from its raw line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParseDiagnostic {
    /// The line had a different number of cells than the header.
    ColumnCount { expected: usize, found: usize },
    /// A cell could not be coerced to its declared type and became Null.
    Coercion {
        field: String,
        raw: String,
        expected: FieldType,
    },
}

/// One typed row.
///
/// Records are never mutated: [`Record::with_value`] returns a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    index: usize,
    values: BTreeMap<String, Value>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Record {
    pub fn new(
        index: usize,
        values: BTreeMap<String, Value>,
        diagnostics: Vec<ParseDiagnostic>,
    ) -> Self {
        Self {
            index,
            values,
            diagnostics,
        }
    }

    /// Convenience constructor without diagnostics.
    pub fn from_values<I, K>(index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(
            index,
            values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            Vec::new(),
        )
    }

    /// Ordinal position of the source line among data rows (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of a field; absent fields read as Null.
    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// Raw text of a field whose coercion failed.
    pub fn coercion_failure(&self, field: &str) -> Option<&str> {
        self.diagnostics.iter().find_map(|diagnostic| match diagnostic {
            ParseDiagnostic::Coercion {
                field: failed, raw, ..
            } if failed == field => Some(raw.as_str()),
            _ => None,
        })
    }

    /// Null because the source cell was empty, not because coercion failed.
    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_null() && self.coercion_failure(field).is_none()
    }

    /// Text a rule should inspect for a field: the raw text when coercion
    /// failed, otherwise the rendered value.
    pub fn source_text(&self, field: &str) -> Option<String> {
        match self.coercion_failure(field) {
            Some(raw) => Some(raw.to_string()),
            None => self.get(field).render(),
        }
    }

    /// Whether the source line had the wrong number of cells.
    pub fn is_malformed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, ParseDiagnostic::ColumnCount { .. }))
    }

    /// New record with one field replaced.
    #[must_use]
    pub fn with_value(&self, field: &str, value: Value) -> Self {
        let mut values = self.values.clone();
        values.insert(field.to_string(), value);
        Self {
            index: self.index,
            values,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_failure() -> Record {
        Record::new(
            3,
            BTreeMap::from([("ORDERNUMBER".to_string(), Value::Null)]),
            vec![ParseDiagnostic::Coercion {
                field: "ORDERNUMBER".to_string(),
                raw: "ORD7".to_string(),
                expected: FieldType::Integer,
            }],
        )
    }

    #[test]
    fn coercion_failure_is_not_missing() {
        let record = record_with_failure();
        assert!(record.get("ORDERNUMBER").is_null());
        assert!(!record.is_missing("ORDERNUMBER"));
        assert_eq!(record.coercion_failure("ORDERNUMBER"), Some("ORD7"));
        assert_eq!(record.source_text("ORDERNUMBER").as_deref(), Some("ORD7"));
    }

    #[test]
    fn absent_field_reads_as_missing() {
        let record = record_with_failure();
        assert!(record.is_missing("CITY"));
        assert_eq!(record.source_text("CITY"), None);
    }

    #[test]
    fn with_value_leaves_original_untouched() {
        let record = Record::from_values(0, [("CITY", Value::Null)]);
        let updated = record.with_value("CITY", Value::text("Lima"));
        assert!(record.get("CITY").is_null());
        assert_eq!(updated.get("CITY").as_text(), Some("Lima"));
        assert_eq!(updated.index(), 0);
    }
}
