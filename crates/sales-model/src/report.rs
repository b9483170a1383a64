//! Batch accounting for a cleaning run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decision::{DropReason, RuleId};

/// One excluded row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub row_index: usize,
    pub rule: RuleId,
    pub reason: DropReason,
    /// Offending raw text when the drop traces back to a coercion failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate and per-row accounting of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: u64,
    pub output_rows: u64,
    pub dropped_by_rule: BTreeMap<RuleId, u64>,
    pub altered_by_rule: BTreeMap<RuleId, u64>,
    pub coercion_failures: BTreeMap<String, u64>,
    pub malformed_rows: u64,
    pub drops: Vec<DropEvent>,
}

impl CleaningReport {
    pub fn dropped_rows(&self) -> u64 {
        self.input_rows.saturating_sub(self.output_rows)
    }

    /// Share of input rows that were dropped, in percent.
    pub fn drop_percentage(&self) -> f64 {
        if self.input_rows == 0 {
            0.0
        } else {
            self.dropped_rows() as f64 / self.input_rows as f64 * 100.0
        }
    }

    pub fn dropped_by(&self, rule: RuleId) -> u64 {
        self.dropped_by_rule.get(&rule).copied().unwrap_or(0)
    }

    pub fn altered_by(&self, rule: RuleId) -> u64 {
        self.altered_by_rule.get(&rule).copied().unwrap_or(0)
    }

    /// Drop counts keyed by reason code.
    pub fn dropped_by_reason(&self) -> BTreeMap<DropReason, u64> {
        let mut counts = BTreeMap::new();
        for event in &self.drops {
            *counts.entry(event.reason).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CleaningReport {
        CleaningReport {
            input_rows: 4,
            output_rows: 3,
            dropped_by_rule: BTreeMap::from([(RuleId(6), 1)]),
            altered_by_rule: BTreeMap::from([(RuleId(20), 2)]),
            coercion_failures: BTreeMap::new(),
            malformed_rows: 0,
            drops: vec![DropEvent {
                row_index: 2,
                rule: RuleId(6),
                reason: DropReason::DuplicateRow,
                detail: None,
            }],
        }
    }

    #[test]
    fn report_counts() {
        let report = sample();
        assert_eq!(report.dropped_rows(), 1);
        assert_eq!(report.drop_percentage(), 25.0);
        assert_eq!(report.dropped_by(RuleId(6)), 1);
        assert_eq!(report.dropped_by(RuleId(1)), 0);
        assert_eq!(report.altered_by(RuleId(20)), 2);
        assert_eq!(
            report.dropped_by_reason().get(&DropReason::DuplicateRow),
            Some(&1)
        );
    }

    #[test]
    fn empty_report_has_zero_percentage() {
        assert_eq!(CleaningReport::default().drop_percentage(), 0.0);
    }

    #[test]
    fn report_serializes() {
        let json = serde_json::to_string(&sample()).expect("serialize report");
        assert!(json.contains("\"dropped_by_rule\":{\"6\":1}"));
        assert!(json.contains("\"reason\":\"duplicate-row\""));
        assert!(!json.contains("detail"));
        let round: CleaningReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round, sample());
    }
}
