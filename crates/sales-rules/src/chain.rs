//! The rule chain engine.
//!
//! A chain applies its rules to every record in table order. The first drop
//! ends evaluation for that record; transforms replace the record and move on
//! to the next rule.
//!
//! # Evaluation model
//!
//! The rule table is split into segments at rules that use [`RunState`].
//! A stateless segment is evaluated for all pending records, in parallel
//! across scoped worker threads when more than one worker is configured.
//! A stateful rule is evaluated on the calling thread in input order, so
//! "first occurrence wins" never depends on scheduling. Records keep their
//! slot throughout, which keeps the output in input order.
//!
//! Duplicate detection compares records as they will be emitted, after the
//! rewrites of the rules that follow it, so cleaned output is a fixed point
//! of the chain.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, trace};

use sales_model::{
    CleaningReport, Decision, DropEvent, ParseDiagnostic, Record, RuleId, Schema,
};

use crate::config::CleaningConfig;
use crate::error::{Result, RuleError};
use crate::rule::Rule;
use crate::rules::{CANONICAL_RULE_IDS, canonical_rules};
use crate::state::RunState;

/// A contiguous run of the rule table with a single evaluation mode.
enum Segment<'a> {
    Stateless(&'a [Arc<dyn Rule>]),
    Stateful(&'a Arc<dyn Rule>),
}

/// One input record on its way through the chain.
struct Slot {
    record: Record,
    altered_by: Vec<RuleId>,
    dropped: Option<DropEvent>,
}

impl Slot {
    fn new(record: Record) -> Self {
        Self {
            record,
            altered_by: Vec::new(),
            dropped: None,
        }
    }

    fn step(&mut self, rule: &dyn Rule, state: &RunState) {
        if self.dropped.is_some() {
            return;
        }
        let metadata = rule.metadata();
        match rule.apply(&self.record, state) {
            Decision::Keep(next) => {
                if next.values() != self.record.values() {
                    trace!(
                        row_index = self.record.index(),
                        rule = %metadata.id,
                        "record altered"
                    );
                    self.altered_by.push(metadata.id);
                }
                self.record = next;
            }
            Decision::Drop { rule: id, reason } => {
                let detail = metadata
                    .fields
                    .iter()
                    .find_map(|field| self.record.coercion_failure(field))
                    .map(str::to_string);
                debug!(
                    row_index = self.record.index(),
                    rule = %id,
                    %reason,
                    detail = detail.as_deref().unwrap_or(""),
                    "record dropped"
                );
                self.dropped = Some(DropEvent {
                    row_index: self.record.index(),
                    rule: id,
                    reason,
                    detail,
                });
            }
        }
    }

    fn run_all(&mut self, rules: &[Arc<dyn Rule>], state: &RunState) {
        for rule in rules {
            if self.dropped.is_some() {
                break;
            }
            self.step(rule.as_ref(), state);
        }
    }
}

/// Ordered list of rules plus the schema they were validated against.
pub struct RuleChain {
    schema: Schema,
    rules: Vec<Arc<dyn Rule>>,
    workers: usize,
}

impl std::fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<RuleId> = self.rules.iter().map(|rule| rule.metadata().id).collect();
        f.debug_struct("RuleChain")
            .field("rules", &ids)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl RuleChain {
    /// Build a chain, checking every referenced field against `schema`.
    pub fn new(schema: Schema, rules: Vec<Arc<dyn Rule>>) -> Result<Self> {
        let mut ids = BTreeSet::new();
        for rule in &rules {
            let metadata = rule.metadata();
            if !ids.insert(metadata.id) {
                return Err(RuleError::DuplicateRule(metadata.id));
            }
            for field in &metadata.fields {
                schema
                    .field(field)
                    .map_err(|source| RuleError::SchemaMismatch {
                        rule: metadata.id,
                        source,
                    })?;
            }
        }
        Ok(Self {
            schema,
            rules,
            workers: 1,
        })
    }

    /// Build the canonical chain, tuned and filtered by `config`.
    pub fn from_config(schema: Schema, config: &CleaningConfig) -> Result<Self> {
        if let Some(unknown) = config
            .rules
            .disabled
            .iter()
            .find(|id| !CANONICAL_RULE_IDS.contains(id))
        {
            return Err(RuleError::UnknownRule(*unknown));
        }
        let rules: Vec<Arc<dyn Rule>> = canonical_rules(&config.rules)
            .into_iter()
            .filter(|rule| !config.is_rule_disabled(rule.metadata().id.number()))
            .collect();
        if !config.rules.disabled.is_empty() {
            info!(disabled = ?config.rules.disabled, "rules disabled by configuration");
        }
        Ok(Self::new(schema, rules)?.with_workers(config.engine.workers))
    }

    /// Set the number of threads used for stateless segments.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Stateless rules evaluated after the first stateful rule.
    fn finishing_rules(&self) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .skip_while(|rule| !rule.uses_run_state())
            .skip(1)
            .filter(|rule| !rule.uses_run_state())
            .cloned()
            .collect()
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (position, rule) in self.rules.iter().enumerate() {
            if rule.uses_run_state() {
                if start < position {
                    segments.push(Segment::Stateless(&self.rules[start..position]));
                }
                segments.push(Segment::Stateful(rule));
                start = position + 1;
            }
        }
        if start < self.rules.len() {
            segments.push(Segment::Stateless(&self.rules[start..]));
        }
        segments
    }

    fn run_stateless(&self, rules: &[Arc<dyn Rule>], slots: &mut [Slot], state: &RunState) {
        if self.workers <= 1 || slots.len() < 2 {
            for slot in slots.iter_mut() {
                slot.run_all(rules, state);
            }
            return;
        }
        let chunk_size = slots.len().div_ceil(self.workers);
        std::thread::scope(|scope| {
            for chunk in slots.chunks_mut(chunk_size) {
                scope.spawn(move || {
                    for slot in chunk {
                        slot.run_all(rules, state);
                    }
                });
            }
        });
    }

    /// Clean a batch of records.
    ///
    /// Returns the kept records in input order and the finished report.
    pub fn run<I>(&self, records: I) -> (Vec<Record>, CleaningReport)
    where
        I: IntoIterator<Item = Record>,
    {
        let state = RunState::with_finishing_rules(self.finishing_rules());
        let mut slots: Vec<Slot> = records.into_iter().map(Slot::new).collect();

        for segment in self.segments() {
            match segment {
                Segment::Stateless(rules) => self.run_stateless(rules, &mut slots, &state),
                Segment::Stateful(rule) => {
                    for slot in &mut slots {
                        slot.step(rule.as_ref(), &state);
                    }
                }
            }
        }

        let (kept, report) = finish(slots);
        info!(
            input_rows = report.input_rows,
            output_rows = report.output_rows,
            dropped_rows = report.dropped_rows(),
            drop_percentage = %format!("{:.2}", report.drop_percentage()),
            "cleaning finished"
        );
        (kept, report)
    }

    /// Clean a stream whose items may fail.
    ///
    /// The first error aborts the run before any rule is applied; no partial
    /// report is produced.
    pub fn run_fallible<I, E>(
        &self,
        records: I,
    ) -> std::result::Result<(Vec<Record>, CleaningReport), E>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
    {
        let records = records
            .into_iter()
            .collect::<std::result::Result<Vec<_>, E>>()?;
        Ok(self.run(records))
    }
}

fn finish(slots: Vec<Slot>) -> (Vec<Record>, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: slots.len() as u64,
        ..CleaningReport::default()
    };
    let mut kept = Vec::new();

    for slot in slots {
        for diagnostic in slot.record.diagnostics() {
            if let ParseDiagnostic::Coercion { field, .. } = diagnostic {
                *report.coercion_failures.entry(field.clone()).or_insert(0) += 1;
            }
        }
        if slot.record.is_malformed() {
            report.malformed_rows += 1;
        }
        for rule in slot.altered_by {
            *report.altered_by_rule.entry(rule).or_insert(0) += 1;
        }
        match slot.dropped {
            Some(event) => {
                *report.dropped_by_rule.entry(event.rule).or_insert(0) += 1;
                report.drops.push(event);
            }
            None => kept.push(slot.record),
        }
    }

    report.output_rows = kept.len() as u64;
    report.drops.sort_by_key(|event| event.row_index);
    (kept, report)
}

#[cfg(test)]
mod tests {
    use sales_model::{DropReason, FieldDef, FieldType, Value, fields};

    use super::*;
    use crate::rules::{DropDuplicates, DropWhenNull, NullPolicy, TruncateText};

    fn complete(index: usize, quantity: Option<i64>) -> Record {
        Record::from_values(
            index,
            [
                (fields::QUANTITYORDERED, quantity.map_or(Value::Null, Value::Integer)),
                (fields::PRODUCTCODE, Value::text("S10_1678")),
            ],
        )
    }

    #[test]
    fn unknown_field_is_a_schema_mismatch() {
        let schema = Schema::new(vec![FieldDef::new("OTHER", FieldType::Text, true)]).unwrap();
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(TruncateText::new(
            7,
            fields::PRODUCTCODE,
            15,
            "",
        ))];
        let err = RuleChain::new(schema, rules).unwrap_err();
        assert!(matches!(err, RuleError::SchemaMismatch { rule: RuleId(7), .. }));
    }

    #[test]
    fn duplicate_rule_ids_are_rejected() {
        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(DropDuplicates::new(6, "")),
            Arc::new(DropDuplicates::new(6, "")),
        ];
        let err = RuleChain::new(Schema::sales(), rules).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateRule(RuleId(6))));
    }

    #[test]
    fn unknown_disabled_rule_is_rejected() {
        let mut config = CleaningConfig::default();
        config.disable_rules([11]);
        let err = RuleChain::from_config(Schema::sales(), &config).unwrap_err();
        assert!(matches!(err, RuleError::UnknownRule(11)));
    }

    #[test]
    fn disabled_rules_are_left_out() {
        let mut config = CleaningConfig::default();
        config.disable_rules([6, 19]);
        config.engine.workers = 3;
        let chain = RuleChain::from_config(Schema::sales(), &config).unwrap();
        let ids: Vec<u8> = chain.rules().iter().map(|rule| rule.metadata().id.number()).collect();
        assert!(!ids.contains(&6));
        assert!(!ids.contains(&19));
        assert_eq!(ids.len(), CANONICAL_RULE_IDS.len() - 2);
        assert_eq!(chain.workers(), 3);
    }

    #[test]
    fn segments_split_at_stateful_rules() {
        let chain = RuleChain::from_config(Schema::sales(), &CleaningConfig::default()).unwrap();
        let shape: Vec<(bool, usize)> = chain
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Stateless(rules) => (false, rules.len()),
                Segment::Stateful(_) => (true, 1),
            })
            .collect();
        assert_eq!(shape, vec![(false, 5), (true, 1), (false, 12)]);
    }

    #[test]
    fn finishing_rules_follow_deduplication() {
        let chain = RuleChain::from_config(Schema::sales(), &CleaningConfig::default()).unwrap();
        let ids: Vec<u8> = chain
            .finishing_rules()
            .iter()
            .map(|rule| rule.metadata().id.number())
            .collect();
        assert_eq!(ids, vec![7, 8, 9, 10, 13, 14, 15, 16, 17, 18, 19, 20]);

        let mut config = CleaningConfig::default();
        config.disable_rules([6]);
        let chain = RuleChain::from_config(Schema::sales(), &config).unwrap();
        assert!(chain.finishing_rules().is_empty());
    }

    #[test]
    fn first_drop_wins_and_is_reported() {
        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(DropWhenNull::new(
                1,
                fields::QUANTITYORDERED,
                DropReason::MissingQuantity,
                NullPolicy::AnyNull,
                "",
            )),
            Arc::new(DropDuplicates::new(6, "")),
        ];
        let chain = RuleChain::new(Schema::sales(), rules).unwrap();
        let (kept, report) = chain.run(vec![
            complete(0, Some(5)),
            complete(1, None),
            complete(2, Some(5)),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(report.input_rows, 3);
        assert_eq!(report.output_rows, 1);
        assert_eq!(report.dropped_by(RuleId(1)), 1);
        assert_eq!(report.dropped_by(RuleId(6)), 1);
        let rows: Vec<usize> = report.drops.iter().map(|event| event.row_index).collect();
        assert_eq!(rows, vec![1, 2]);
        assert_eq!(report.dropped_rows(), report.drops.len() as u64);
    }

    #[test]
    fn alterations_are_counted() {
        let rules: Vec<Arc<dyn Rule>> =
            vec![Arc::new(TruncateText::new(7, fields::PRODUCTCODE, 3, ""))];
        let chain = RuleChain::new(Schema::sales(), rules).unwrap();
        let (kept, report) = chain.run(vec![complete(0, Some(1)), complete(1, Some(2))]);
        assert_eq!(report.altered_by(RuleId(7)), 2);
        assert_eq!(kept[0].get(fields::PRODUCTCODE).as_text(), Some("S10"));
    }

    #[test]
    fn fallible_stream_aborts_on_error() {
        let chain = RuleChain::from_config(Schema::sales(), &CleaningConfig::default()).unwrap();
        let stream: Vec<std::result::Result<Record, String>> =
            vec![Ok(complete(0, Some(1))), Err("broken".to_string())];
        let err = chain.run_fallible(stream).unwrap_err();
        assert_eq!(err, "broken");
    }

    #[test]
    fn empty_batch_produces_empty_report() {
        let chain = RuleChain::from_config(Schema::sales(), &CleaningConfig::default()).unwrap();
        let (kept, report) = chain.run(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(report, CleaningReport::default());
    }
}
