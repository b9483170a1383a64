use std::collections::BTreeMap;

use sales_model::{CleaningReport, RuleId};

#[derive(Debug)]
pub struct CleanResult {
    pub source_key: String,
    pub input_sha256: String,
    /// `None` for dry runs.
    pub output_key: Option<String>,
    pub report_key: Option<String>,
    pub report: CleaningReport,
    pub rule_descriptions: BTreeMap<RuleId, String>,
}
