//! Error types for the sales codec.

use thiserror::Error;

/// Structural failures while reading or writing sales data.
///
/// Any of these aborts the whole batch. Per-cell problems are never raised:
/// they become Null values with a recorded diagnostic.
#[derive(Debug, Error)]
pub enum CodecError {
    // === Input Errors ===
    /// The input has no header row.
    #[error("input is empty: no header row found")]
    EmptyInput,

    /// Required columns are absent from the header.
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// The CSV reader could not split the text into rows.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    // === Output Errors ===
    /// JSON encoding failed.
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing serialized output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::MissingColumns {
            columns: vec!["SALES".to_string(), "ORDERDATE".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column(s): SALES, ORDERDATE"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::other("disk full");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
