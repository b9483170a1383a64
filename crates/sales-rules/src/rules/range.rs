//! Numeric range checks.

use sales_model::{Decision, DropReason, Record, Value};

use crate::rule::{Rule, RuleCategory, RuleMetadata};
use crate::state::RunState;

/// Replaces negative numbers with Null.
#[derive(Debug)]
pub struct NullNegative {
    metadata: RuleMetadata,
    field: &'static str,
}

impl NullNegative {
    pub fn new(id: u8, field: &'static str, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Range, description).with_fields(&[field]),
            field,
        }
    }
}

impl Rule for NullNegative {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        match record.get(self.field).as_decimal() {
            Some(value) if value.is_sign_negative() && !value.is_zero() => {
                Decision::Keep(record.with_value(self.field, Value::Null))
            }
            _ => Decision::Keep(record.clone()),
        }
    }
}

/// Drops records whose number is exactly zero.
#[derive(Debug)]
pub struct DropZero {
    metadata: RuleMetadata,
    field: &'static str,
    reason: DropReason,
}

impl DropZero {
    pub fn new(id: u8, field: &'static str, reason: DropReason, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Range, description).with_fields(&[field]),
            field,
            reason,
        }
    }
}

impl Rule for DropZero {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        match record.get(self.field).as_decimal() {
            Some(value) if value.is_zero() => Decision::drop(self.metadata.id, self.reason),
            _ => Decision::Keep(record.clone()),
        }
    }
}
