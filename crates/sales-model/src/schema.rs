//! Field schema for sales records.
//!
//! The schema is a fixed, ordered declaration of the columns a sales extract
//! carries. Field order is significant: it is the order used when cleaned
//! records are serialized.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Column names of the canonical sales extract.
pub mod fields {
    pub const ORDERNUMBER: &str = "ORDERNUMBER";
    pub const ORDERLINENUMBER: &str = "ORDERLINENUMBER";
    pub const QUANTITYORDERED: &str = "QUANTITYORDERED";
    pub const PRICEEACH: &str = "PRICEEACH";
    pub const SALES: &str = "SALES";
    pub const ORDERDATE: &str = "ORDERDATE";
    pub const STATUS: &str = "STATUS";
    pub const PRODUCTCODE: &str = "PRODUCTCODE";
    pub const PRODUCTLINE: &str = "PRODUCTLINE";
    pub const NUMERICCODE: &str = "NUMERICCODE";
    pub const COUNTRY: &str = "COUNTRY";
    pub const CITY: &str = "CITY";
}

/// Primitive type a field's raw text is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Decimal,
    Text,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    /// Required columns must appear in the input header.
    pub required: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
        }
    }
}

/// Ordered, immutable set of field definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
    /// Maps field name -> position in `fields`
    index: BTreeMap<String, usize>,
}

impl Schema {
    /// Build a schema from field definitions, rejecting duplicate names.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { fields, index })
    }

    /// The canonical sales extract schema.
    pub fn sales() -> Self {
        use fields::{
            CITY, COUNTRY, NUMERICCODE, ORDERDATE, ORDERLINENUMBER, ORDERNUMBER, PRICEEACH,
            PRODUCTCODE, PRODUCTLINE, QUANTITYORDERED, SALES, STATUS,
        };

        let declared = [
            (ORDERNUMBER, FieldType::Integer, true),
            (ORDERLINENUMBER, FieldType::Integer, true),
            (QUANTITYORDERED, FieldType::Integer, true),
            (PRICEEACH, FieldType::Decimal, true),
            (SALES, FieldType::Decimal, true),
            (ORDERDATE, FieldType::Date, true),
            (STATUS, FieldType::Text, false),
            (PRODUCTCODE, FieldType::Text, true),
            (PRODUCTLINE, FieldType::Text, false),
            (NUMERICCODE, FieldType::Decimal, true),
            (COUNTRY, FieldType::Text, false),
            (CITY, FieldType::Text, false),
        ];
        let fields: Vec<FieldDef> = declared
            .into_iter()
            .map(|(name, field_type, required)| FieldDef::new(name, field_type, required))
            .collect();
        let index = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name.clone(), position))
            .collect();
        Self { fields, index }
    }

    /// Declared type of a field.
    pub fn field_type(&self, name: &str) -> Result<FieldType> {
        self.field(name).map(|field| field.field_type)
    }

    /// Field definition by name.
    pub fn field(&self, name: &str) -> Result<&FieldDef> {
        self.index
            .get(name)
            .map(|&position| &self.fields[position])
            .ok_or_else(|| SchemaError::UnknownField {
                field: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a field in schema order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> + '_ {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
