//! Drop rules for missing values.

use sales_model::{Decision, DropReason, Record};

use crate::rule::{Rule, RuleCategory, RuleMetadata};
use crate::state::RunState;

/// Which Null values a [`DropWhenNull`] rule rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Empty cells and cells that failed coercion.
    AnyNull,
    /// Only empty cells; failed coercions are left to a later format rule.
    EmptyOnly,
}

/// Drops records whose field is Null.
#[derive(Debug)]
pub struct DropWhenNull {
    metadata: RuleMetadata,
    field: &'static str,
    reason: DropReason,
    policy: NullPolicy,
}

impl DropWhenNull {
    pub fn new(
        id: u8,
        field: &'static str,
        reason: DropReason,
        policy: NullPolicy,
        description: &str,
    ) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Completeness, description)
                .with_fields(&[field]),
            field,
            reason,
            policy,
        }
    }

    fn rejects(&self, record: &Record) -> bool {
        match self.policy {
            NullPolicy::AnyNull => record.get(self.field).is_null(),
            NullPolicy::EmptyOnly => record.is_missing(self.field),
        }
    }
}

impl Rule for DropWhenNull {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        if self.rejects(record) {
            Decision::drop(self.metadata.id, self.reason)
        } else {
            Decision::Keep(record.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sales_model::{FieldType, ParseDiagnostic, RuleId, Value, fields};

    use super::*;

    fn failed_order_number() -> Record {
        Record::new(
            0,
            BTreeMap::from([(fields::ORDERNUMBER.to_string(), Value::Null)]),
            vec![ParseDiagnostic::Coercion {
                field: fields::ORDERNUMBER.to_string(),
                raw: "ORD1".to_string(),
                expected: FieldType::Integer,
            }],
        )
    }

    #[test]
    fn any_null_rejects_failed_coercion() {
        let rule = DropWhenNull::new(
            1,
            fields::ORDERNUMBER,
            DropReason::MissingOrderNumber,
            NullPolicy::AnyNull,
            "",
        );
        let decision = rule.apply(&failed_order_number(), &RunState::new());
        assert_eq!(
            decision,
            Decision::drop(RuleId(1), DropReason::MissingOrderNumber)
        );
    }

    #[test]
    fn empty_only_passes_failed_coercion() {
        let rule = DropWhenNull::new(
            8,
            fields::ORDERNUMBER,
            DropReason::MissingOrderNumber,
            NullPolicy::EmptyOnly,
            "",
        );
        let state = RunState::new();
        assert!(!rule.apply(&failed_order_number(), &state).is_drop());
        let empty = Record::from_values(1, [(fields::ORDERNUMBER, Value::Null)]);
        assert!(rule.apply(&empty, &state).is_drop());
    }
}
