//! Format checks on the source text of a field.

use sales_model::{Decision, DropReason, Record};

use crate::rule::{Rule, RuleCategory, RuleMetadata};
use crate::state::RunState;

/// Drops records whose field held text that could not be coerced.
///
/// A Null produced by an empty cell or by an earlier transform passes.
#[derive(Debug)]
pub struct DropCoercionFailure {
    metadata: RuleMetadata,
    field: &'static str,
    reason: DropReason,
}

impl DropCoercionFailure {
    pub fn new(id: u8, field: &'static str, reason: DropReason, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Format, description)
                .with_fields(&[field]),
            field,
            reason,
        }
    }
}

impl Rule for DropCoercionFailure {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        if record.coercion_failure(self.field).is_some() {
            Decision::drop(self.metadata.id, self.reason)
        } else {
            Decision::Keep(record.clone())
        }
    }
}

/// Drops records whose field text contains anything but ASCII digits, or
/// starts with a rejected prefix.
///
/// The text inspected is the raw cell when coercion failed and the rendered
/// value otherwise. Empty fields pass.
#[derive(Debug)]
pub struct DropNonDigits {
    metadata: RuleMetadata,
    field: &'static str,
    reason: DropReason,
    rejected_prefix: Option<&'static str>,
}

impl DropNonDigits {
    pub fn new(id: u8, field: &'static str, reason: DropReason, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Format, description)
                .with_fields(&[field]),
            field,
            reason,
            rejected_prefix: None,
        }
    }

    pub fn with_rejected_prefix(mut self, prefix: &'static str) -> Self {
        self.rejected_prefix = Some(prefix);
        self
    }

    fn rejects(&self, text: &str) -> bool {
        let prefixed = self
            .rejected_prefix
            .is_some_and(|prefix| text.starts_with(prefix));
        prefixed || !text.chars().all(|c| c.is_ascii_digit())
    }
}

impl Rule for DropNonDigits {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        match record.source_text(self.field) {
            Some(text) if self.rejects(&text) => Decision::drop(self.metadata.id, self.reason),
            _ => Decision::Keep(record.clone()),
        }
    }
}
