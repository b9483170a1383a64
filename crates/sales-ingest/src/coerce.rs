//! Type-specific parsers for raw cell text.
//!
//! Every parser fails soft: a value that cannot be coerced becomes `None`
//! and the caller records a diagnostic instead of raising.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use sales_model::{FieldType, Value};

/// Accepted date layouts, tried in order; the first match wins.
pub const DATE_INPUT_FORMATS: &[&str] = &["%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y"];

/// Text values that read as `true` (compared case-insensitively).
const TRUE_VALUES: &[&str] = &["activo", "true", "1"];

/// Parse an integer, accepting decimals with a zero fraction (`"5.0"`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let decimal = parse_decimal(trimmed)?;
    if decimal.fract().is_zero() {
        decimal.trunc().to_i64()
    } else {
        None
    }
}

/// Parse a decimal, keeping the scale written in the source text.
///
/// Values must fit a 96-bit mantissa with at most 28 fractional digits.
/// Numeric text beyond that (`1e99`, `1e-30`) fails like any other
/// uncoercible cell.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains(['e', 'E']) {
        return Decimal::from_scientific(trimmed).ok();
    }
    Decimal::from_str(trimmed).ok()
}

/// Parse a date against [`DATE_INPUT_FORMATS`]; date-only values land on midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in DATE_INPUT_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value);
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

pub fn parse_boolean(raw: &str) -> bool {
    let trimmed = raw.trim();
    TRUE_VALUES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(trimmed))
}

/// Coerce raw text to the declared type.
///
/// Empty text is `Some(Value::Null)`; `None` means the text was present but
/// could not be coerced.
pub fn coerce_value(raw: &str, field_type: FieldType) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Value::Null);
    }
    match field_type {
        FieldType::Integer => parse_integer(trimmed).map(Value::Integer),
        FieldType::Decimal => parse_decimal(trimmed).map(Value::Decimal),
        FieldType::Date => parse_date(trimmed).map(Value::Date),
        FieldType::Boolean => Some(Value::Boolean(parse_boolean(trimmed))),
        FieldType::Text => Some(Value::text(trimmed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("5"), Some(5));
        assert_eq!(parse_integer(" 42 "), Some(42));
        assert_eq!(parse_integer("5.0"), Some(5));
        assert_eq!(parse_integer("-3"), Some(-3));
        assert_eq!(parse_integer("5.5"), None);
        assert_eq!(parse_integer("ORD1"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn decimals_keep_scale() {
        assert_eq!(parse_decimal("100.00").map(|d| d.to_string()).as_deref(), Some("100.00"));
        assert_eq!(parse_decimal("-3.50").map(|d| d.to_string()).as_deref(), Some("-3.50"));
        assert_eq!(parse_decimal("1e3").map(|d| d.to_string()).as_deref(), Some("1000"));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn decimals_outside_the_representable_range_fail() {
        assert_eq!(parse_decimal("1e99"), None);
        assert_eq!(parse_decimal("1e-30"), None);
        assert_eq!(parse_decimal("79228162514264337593543950336"), None);
        assert_eq!(
            parse_decimal("79228162514264337593543950335"),
            Some(Decimal::MAX)
        );
    }

    #[test]
    fn dates_try_formats_in_order() {
        let with_time = parse_date("1/2/2019 10:00").unwrap();
        assert_eq!(with_time.to_string(), "2019-01-02 10:00:00");

        let iso = parse_date("2019-01-02 10:00:00").unwrap();
        assert_eq!(iso, with_time);

        let date_only = parse_date("12/31/2003").unwrap();
        assert_eq!(date_only.to_string(), "2003-12-31 00:00:00");

        assert_eq!(parse_date("31/12/2003"), None);
        assert_eq!(parse_date("fecha invalida"), None);
    }

    #[test]
    fn booleans() {
        assert!(parse_boolean("Activo"));
        assert!(parse_boolean("TRUE"));
        assert!(parse_boolean("1"));
        assert!(!parse_boolean("inactivo"));
        assert!(!parse_boolean("0"));
    }

    #[test]
    fn coerce_distinguishes_empty_from_failure() {
        assert_eq!(coerce_value("", FieldType::Integer), Some(Value::Null));
        assert_eq!(coerce_value("   ", FieldType::Decimal), Some(Value::Null));
        assert_eq!(coerce_value("xx", FieldType::Decimal), None);
        assert_eq!(coerce_value("xx", FieldType::Boolean), Some(Value::Boolean(false)));
        assert_eq!(coerce_value(" Lima ", FieldType::Text), Some(Value::text("Lima")));
    }
}
