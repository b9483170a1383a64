//! Run-scoped shared state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use sales_model::{Decision, ParseDiagnostic, Record, Value};

use crate::rule::Rule;

/// Identity of a record for duplicate detection: its typed values plus the
/// raw text of any cell that failed coercion, so `ORD1` and `ORD2` (both
/// Null) are not mistaken for each other.
type Fingerprint = (BTreeMap<String, Value>, Vec<(String, String)>);

fn fingerprint(record: &Record) -> Fingerprint {
    let failures = record
        .diagnostics()
        .iter()
        .filter_map(|diagnostic| match diagnostic {
            ParseDiagnostic::Coercion { field, raw, .. } => Some((field.clone(), raw.clone())),
            ParseDiagnostic::ColumnCount { .. } => None,
        })
        .collect();
    (record.values().clone(), failures)
}

/// State shared by the records of one run.
///
/// Holds the set of records accepted by duplicate detection. A fresh state is
/// created for every run and dropped when the run returns.
///
/// Records are compared in the form they will be emitted. Before a record is
/// fingerprinted it passes through the finishing rules, the stateless rules
/// evaluated after duplicate detection. Only their rewrites apply there; a
/// drop decision leaves the record as it is.
#[derive(Debug, Default)]
pub struct RunState {
    seen: Mutex<BTreeSet<Fingerprint>>,
    finishing: Vec<Arc<dyn Rule>>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose duplicate check looks past `finishing`.
    ///
    /// Rules that use run state are ignored.
    pub fn with_finishing_rules(finishing: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            seen: Mutex::default(),
            finishing: finishing
                .into_iter()
                .filter(|rule| !rule.uses_run_state())
                .collect(),
        }
    }

    fn emitted_form(&self, record: &Record) -> Record {
        self.finishing
            .iter()
            .fold(record.clone(), |current, rule| match rule.apply(&current, self) {
                Decision::Keep(next) => next,
                Decision::Drop { .. } => current,
            })
    }

    /// Register a record; returns `false` if a record with the same emitted
    /// form was already registered.
    pub fn insert_if_new(&self, record: &Record) -> bool {
        let key = fingerprint(&self.emitted_form(record));
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }
}

#[cfg(test)]
mod tests {
    use sales_model::{DropReason, FieldType, fields};

    use super::*;
    use crate::rules::{DropWhenNull, NullPolicy, StripPictographs};

    #[test]
    fn identical_records_register_once() {
        let state = RunState::new();
        let first = Record::from_values(0, [("CITY", Value::text("Lima"))]);
        let second = Record::from_values(1, [("CITY", Value::text("Lima"))]);
        assert!(state.insert_if_new(&first));
        assert!(!state.insert_if_new(&second));
    }

    #[test]
    fn failed_cells_keep_records_apart() {
        let state = RunState::new();
        let failed = |index, raw: &str| {
            Record::new(
                index,
                BTreeMap::from([("ORDERNUMBER".to_string(), Value::Null)]),
                vec![ParseDiagnostic::Coercion {
                    field: "ORDERNUMBER".to_string(),
                    raw: raw.to_string(),
                    expected: FieldType::Integer,
                }],
            )
        };
        assert!(state.insert_if_new(&failed(0, "ORD1")));
        assert!(state.insert_if_new(&failed(1, "ORD2")));
        assert!(!state.insert_if_new(&failed(2, "ORD1")));
    }

    #[test]
    fn records_compare_after_finishing_rewrites() {
        let strip: Arc<dyn Rule> = Arc::new(StripPictographs::new(19, fields::COUNTRY, ""));
        let state = RunState::with_finishing_rules(vec![strip]);
        let flagged = Record::from_values(0, [(fields::COUNTRY, Value::text("Perú🇵🇪"))]);
        let plain = Record::from_values(1, [(fields::COUNTRY, Value::text("Perú"))]);
        assert!(state.insert_if_new(&flagged));
        assert!(!state.insert_if_new(&plain));
    }

    #[test]
    fn finishing_drops_do_not_stop_rewrites() {
        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(DropWhenNull::new(
                14,
                fields::NUMERICCODE,
                DropReason::NonNumericCode,
                NullPolicy::AnyNull,
                "",
            )),
            Arc::new(StripPictographs::new(19, fields::COUNTRY, "")),
        ];
        let state = RunState::with_finishing_rules(rules);
        let flagged = Record::from_values(0, [(fields::COUNTRY, Value::text("Chile🇨🇱"))]);
        let plain = Record::from_values(1, [(fields::COUNTRY, Value::text("Chile"))]);
        assert!(state.insert_if_new(&flagged));
        assert!(!state.insert_if_new(&plain));
    }

    #[test]
    fn plain_state_compares_values_as_given() {
        let state = RunState::new();
        let flagged = Record::from_values(0, [(fields::COUNTRY, Value::text("Perú🇵🇪"))]);
        let plain = Record::from_values(1, [(fields::COUNTRY, Value::text("Perú"))]);
        assert!(state.insert_if_new(&flagged));
        assert!(state.insert_if_new(&plain));
    }
}
