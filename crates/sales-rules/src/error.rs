//! Error types for rule configuration and chain construction.

use std::path::PathBuf;

use thiserror::Error;

use sales_model::{RuleId, SchemaError};

/// Failures raised while building a rule chain.
///
/// None of these occur while records are processed: rule violations are
/// drop decisions, not errors.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule references a field the schema does not declare.
    #[error("rule {rule} references a field unknown to the schema: {source}")]
    SchemaMismatch {
        rule: RuleId,
        #[source]
        source: SchemaError,
    },

    /// Two rules share the same id.
    #[error("duplicate rule id {0}")]
    DuplicateRule(RuleId),

    /// Configuration names a rule that does not exist.
    #[error("unknown rule id {0}")]
    UnknownRule(u8),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::CleaningConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuleError::SchemaMismatch {
            rule: RuleId(7),
            source: SchemaError::UnknownField {
                field: "PRODUCTCODE".to_string(),
            },
        };
        assert!(err.to_string().starts_with("rule R07 references"));
        assert_eq!(RuleError::UnknownRule(11).to_string(), "unknown rule id 11");
        assert_eq!(
            RuleError::DuplicateRule(RuleId(6)).to_string(),
            "duplicate rule id R06"
        );
    }
}
