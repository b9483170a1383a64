use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Rendering used for `Date` values in every output format.
///
/// This is also one of the accepted input formats, so cleaned output can be
/// parsed again without loss.
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A typed field value.
///
/// Values are totally ordered so whole records can be compared and stored in
/// ordered sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDateTime),
    Boolean(bool),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(value) => Some(*value),
            Value::Integer(value) => Some(Decimal::from(*value)),
            _ => None,
        }
    }

    /// Text rendering of the value, `None` for Null.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(value) => Some(value.to_string()),
            Value::Decimal(value) => Some(value.to_string()),
            Value::Text(text) => Some(text.clone()),
            Value::Date(value) => Some(value.format(DATE_OUTPUT_FORMAT).to_string()),
            Value::Boolean(value) => Some(value.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}
