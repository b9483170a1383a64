//! Rule trait and metadata.
//!
//! Every cleaning step is a [`Rule`]: it inspects one record and either keeps
//! it (possibly rewritten) or drops it with a reason. Rules never mutate the
//! record they are given.

use serde::Serialize;

use sales_model::{Decision, Record, RuleId};

use crate::state::RunState;

/// What kind of check or transform a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// Drops records whose value is missing or could not be coerced.
    Completeness,
    /// Drops or nulls values outside the accepted range.
    Range,
    /// Drops records whose text is not in the expected format.
    Format,
    /// Rewrites a value into its canonical form.
    Normalization,
    /// Fills a missing value with a default.
    Default,
    /// Drops repeated records.
    Deduplication,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Completeness => "completeness",
            RuleCategory::Range => "range",
            RuleCategory::Format => "format",
            RuleCategory::Normalization => "normalization",
            RuleCategory::Default => "default",
            RuleCategory::Deduplication => "deduplication",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a cleaning rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    pub id: RuleId,
    pub category: RuleCategory,
    pub description: String,
    /// Fields the rule reads or writes. Empty for whole-record rules.
    pub fields: Vec<String>,
}

impl RuleMetadata {
    pub fn new(id: u8, category: RuleCategory, description: impl Into<String>) -> Self {
        Self {
            id: RuleId(id),
            category,
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Set the fields this rule touches.
    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|field| (*field).to_string()).collect();
        self
    }
}

/// A single ordered validation or transformation step.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    /// Whether the rule reads or writes [`RunState`].
    ///
    /// Stateful rules are evaluated on one thread in input order.
    fn uses_run_state(&self) -> bool {
        false
    }

    /// Decide the fate of one record.
    fn apply(&self, record: &Record, state: &RunState) -> Decision;
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.metadata().id)
            .field("category", &self.metadata().category)
            .finish()
    }
}
