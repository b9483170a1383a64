use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Stable number of a cleaning rule (gaps are intentional: 11 and 12 are
/// documentation-only restatements of 5 and 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u8);

impl RuleId {
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{:02}", self.0)
    }
}

/// Why a record was excluded from the cleaned output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropReason {
    MissingQuantity,
    InvalidDate,
    NonNumericSales,
    DuplicateRow,
    MissingOrderNumber,
    MissingLineNumber,
    ZeroQuantity,
    NonNumericCode,
    NonNumericPrice,
    NonNumericOrderNumber,
    InvalidLineNumber,
}

impl DropReason {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            DropReason::MissingQuantity => "missing-quantity",
            DropReason::InvalidDate => "invalid-date",
            DropReason::NonNumericSales => "non-numeric-sales",
            DropReason::DuplicateRow => "duplicate-row",
            DropReason::MissingOrderNumber => "missing-order-number",
            DropReason::MissingLineNumber => "missing-line-number",
            DropReason::ZeroQuantity => "zero-quantity",
            DropReason::NonNumericCode => "non-numeric-code",
            DropReason::NonNumericPrice => "non-numeric-price",
            DropReason::NonNumericOrderNumber => "non-numeric-order-number",
            DropReason::InvalidLineNumber => "invalid-line-number",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of applying one rule to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Continue with this (possibly rewritten) record.
    Keep(Record),
    /// Stop evaluating; the record is excluded.
    Drop { rule: RuleId, reason: DropReason },
}

impl Decision {
    pub fn drop(rule: RuleId, reason: DropReason) -> Self {
        Decision::Drop { rule, reason }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Decision::Drop { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_match_serde_names() {
        let reasons = [
            DropReason::MissingQuantity,
            DropReason::DuplicateRow,
            DropReason::NonNumericOrderNumber,
            DropReason::InvalidLineNumber,
        ];
        for reason in reasons {
            let json = serde_json::to_string(&reason).expect("serialize reason");
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn rule_id_display_is_padded() {
        assert_eq!(RuleId(6).to_string(), "R06");
        assert_eq!(RuleId(20).to_string(), "R20");
    }
}
