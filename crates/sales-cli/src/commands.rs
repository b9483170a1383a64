use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use tracing::info_span;

use sales_cli::pipeline::{clean_bytes, lookup, process_key};
use sales_cli::store::{ArtifactStore, FsStore, OutputFormat, raw_key};
use sales_model::{RuleId, Schema};
use sales_rules::{CleaningConfig, RuleChain};

use crate::cli::{ChainArgs, CleanArgs, RulesArgs, ShowArgs};
use crate::summary::apply_table_style;
use crate::types::CleanResult;

/// Build the rule chain from the config file and command-line overrides.
fn build_chain(args: &ChainArgs, workers: Option<usize>) -> Result<RuleChain> {
    let mut config = match &args.config {
        Some(path) => CleaningConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => CleaningConfig::default(),
    };
    config.disable_rules(args.disable_rule.iter().copied());
    if let Some(workers) = workers {
        config.engine.workers = workers;
    }
    RuleChain::from_config(Schema::sales(), &config).context("build rule chain")
}

fn rule_descriptions(chain: &RuleChain) -> BTreeMap<RuleId, String> {
    chain
        .rules()
        .iter()
        .map(|rule| {
            let metadata = rule.metadata();
            (metadata.id, metadata.description.clone())
        })
        .collect()
}

pub fn run_clean(args: &CleanArgs) -> Result<CleanResult> {
    let span = info_span!("clean_file", input = %args.input.display());
    let _guard = span.enter();

    let chain = build_chain(&args.chain, args.workers)?;
    let format = if args.csv {
        OutputFormat::Csv
    } else {
        OutputFormat::Json
    };
    let raw = fs::read(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("input path has no file name: {}", args.input.display()))?;
    let source_key = raw_key(file_name);

    if args.dry_run {
        let cleaned = clean_bytes(&raw, &chain, format)?;
        return Ok(CleanResult {
            source_key,
            input_sha256: cleaned.input_sha256,
            output_key: None,
            report_key: None,
            report: cleaned.report,
            rule_descriptions: rule_descriptions(&chain),
        });
    }

    let store = FsStore::new(&args.store);
    store
        .put(&source_key, &raw)
        .with_context(|| format!("upload {source_key}"))?;
    let (cleaned, persisted) = process_key(&store, &source_key, &chain, format)?;
    Ok(CleanResult {
        source_key,
        input_sha256: cleaned.input_sha256,
        output_key: Some(persisted.output_key),
        report_key: Some(persisted.report_key),
        report: cleaned.report,
        rule_descriptions: rule_descriptions(&chain),
    })
}

/// Fetch a cleaned artifact; `Ok(None)` when it does not exist.
pub fn run_show(args: &ShowArgs) -> Result<Option<Vec<u8>>> {
    let store = FsStore::new(&args.store);
    lookup(&store, &args.file_id)
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let chain = build_chain(&args.chain, None)?;
    let mut table = Table::new();
    table.set_header(vec!["Rule", "Category", "Fields", "Description"]);
    apply_table_style(&mut table);
    for rule in chain.rules() {
        let metadata = rule.metadata();
        let fields = if metadata.fields.is_empty() {
            "(whole record)".to_string()
        } else {
            metadata.fields.join(", ")
        };
        table.add_row(vec![
            metadata.id.to_string(),
            metadata.category.to_string(),
            fields,
            metadata.description.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}
