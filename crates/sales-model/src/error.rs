use thiserror::Error;

/// Errors raised while building or querying a [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name was looked up that the schema does not declare.
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// The same field name was declared twice.
    #[error("duplicate field in schema: {field}")]
    DuplicateField { field: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
