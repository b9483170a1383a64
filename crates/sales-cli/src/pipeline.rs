//! Parse, clean and persist one sales extract.
//!
//! Each stage runs inside its own span (`parse`, `clean`, `write`) so stage
//! timing is visible in JSON logs.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, info_span};

use sales_ingest::{parse, serialize_csv, serialize_json};
use sales_model::{CleaningReport, Record};
use sales_rules::RuleChain;

use crate::store::{ArtifactStore, OutputFormat, cleaned_key, file_id_from_key, report_key};

/// Persisted next to each cleaned artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub source_key: String,
    /// SHA-256 of the raw input, hex encoded.
    pub input_sha256: String,
    pub report: CleaningReport,
}

/// Result of cleaning one extract in memory.
#[derive(Debug)]
pub struct CleanOutput {
    pub kept: Vec<Record>,
    pub report: CleaningReport,
    /// Serialized kept records.
    pub output: Vec<u8>,
    pub input_sha256: String,
}

/// Where a processed extract was written.
#[derive(Debug)]
pub struct Persisted {
    pub file_id: String,
    pub output_key: String,
    pub report_key: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Run the codec and rule chain over raw CSV bytes.
///
/// Any structural failure aborts with no output.
pub fn clean_bytes(raw: &[u8], chain: &RuleChain, format: OutputFormat) -> Result<CleanOutput> {
    let input_sha256 = sha256_hex(raw);
    let text = std::str::from_utf8(raw).context("input is not valid UTF-8")?;

    let records = {
        let _span = info_span!("parse").entered();
        parse(text, chain.schema()).context("parse CSV header")?
    };

    let (kept, report) = {
        let _span = info_span!("clean", workers = chain.workers()).entered();
        chain.run_fallible(records).context("read CSV rows")?
    };

    let output = {
        let _span = info_span!("write", format = format.extension()).entered();
        let serialized = match format {
            OutputFormat::Json => serialize_json(&kept, chain.schema()),
            OutputFormat::Csv => serialize_csv(&kept, chain.schema()),
        };
        serialized.context("serialize cleaned records")?
    };

    Ok(CleanOutput {
        kept,
        report,
        output,
        input_sha256,
    })
}

/// Write the cleaned artifact and its report for `source_key`.
pub fn persist(
    store: &dyn ArtifactStore,
    source_key: &str,
    cleaned: &CleanOutput,
    format: OutputFormat,
) -> Result<Persisted> {
    let file_id = file_id_from_key(source_key).to_string();
    let output_key = cleaned_key(&file_id, format);
    let report_key = report_key(&file_id);

    let envelope = ReportEnvelope {
        source_key: source_key.to_string(),
        input_sha256: cleaned.input_sha256.clone(),
        report: cleaned.report.clone(),
    };
    let mut report_bytes =
        serde_json::to_vec_pretty(&envelope).context("serialize cleaning report")?;
    report_bytes.push(b'\n');

    store
        .put(&output_key, &cleaned.output)
        .with_context(|| format!("store {output_key}"))?;
    store
        .put(&report_key, &report_bytes)
        .with_context(|| format!("store {report_key}"))?;
    info!(%output_key, %report_key, "cleaned artifact stored");

    Ok(Persisted {
        file_id,
        output_key,
        report_key,
    })
}

/// Fetch `source_key` from the store, clean it and store the results.
pub fn process_key(
    store: &dyn ArtifactStore,
    source_key: &str,
    chain: &RuleChain,
    format: OutputFormat,
) -> Result<(CleanOutput, Persisted)> {
    let raw = store
        .fetch(source_key)
        .with_context(|| format!("fetch {source_key}"))?
        .ok_or_else(|| anyhow!("source artifact not found: {source_key}"))?;
    let cleaned = clean_bytes(&raw, chain, format)?;
    let persisted = persist(store, source_key, &cleaned, format)?;
    Ok((cleaned, persisted))
}

/// Look up a previously cleaned artifact by file id.
///
/// Tries JSON first, then CSV. `Ok(None)` when neither exists.
pub fn lookup(store: &dyn ArtifactStore, file_id: &str) -> Result<Option<Vec<u8>>> {
    for format in [OutputFormat::Json, OutputFormat::Csv] {
        let key = cleaned_key(file_id, format);
        if let Some(bytes) = store.fetch(&key).with_context(|| format!("fetch {key}"))? {
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}
