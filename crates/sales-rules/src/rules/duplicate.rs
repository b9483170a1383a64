use sales_model::{Decision, DropReason, Record};

use crate::rule::{Rule, RuleCategory, RuleMetadata};
use crate::state::RunState;

/// Drops a record identical to one already accepted in this run.
#[derive(Debug)]
pub struct DropDuplicates {
    metadata: RuleMetadata,
}

impl DropDuplicates {
    pub fn new(id: u8, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Deduplication, description),
        }
    }
}

impl Rule for DropDuplicates {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn uses_run_state(&self) -> bool {
        true
    }

    fn apply(&self, record: &Record, state: &RunState) -> Decision {
        if state.insert_if_new(record) {
            Decision::Keep(record.clone())
        } else {
            Decision::drop(self.metadata.id, DropReason::DuplicateRow)
        }
    }
}
