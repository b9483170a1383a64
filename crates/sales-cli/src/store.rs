//! Artifact storage.
//!
//! Raw extracts and cleaned outputs live under string keys such as
//! `raw/sales.csv` or `processed/cleaned_sales.json`. [`FsStore`] maps keys
//! to files below a root directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Prefix for source extracts.
pub const RAW_PREFIX: &str = "raw/";
/// Prefix for cleaned outputs and their reports.
pub const PROCESSED_PREFIX: &str = "processed/";

/// Output encoding of a cleaned artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Key-addressed blob storage.
pub trait ArtifactStore {
    /// Read an artifact; `Ok(None)` when the key does not exist.
    fn fetch(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Create or replace an artifact.
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key; rejects keys that would escape the root.
    pub fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid artifact key: {key:?}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for FsStore {
    fn fetch(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "fetched artifact");
                Ok(Some(bytes))
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        debug!(key, bytes = bytes.len(), "stored artifact");
        Ok(())
    }
}

/// File id of a source key: its last segment without the `.csv` extension.
pub fn file_id_from_key(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_suffix(".csv").unwrap_or(name)
}

/// Key under which a local file is uploaded.
pub fn raw_key(file_name: &str) -> String {
    format!("{RAW_PREFIX}{file_name}")
}

/// Key of the cleaned artifact for a file id.
pub fn cleaned_key(file_id: &str, format: OutputFormat) -> String {
    format!("{PROCESSED_PREFIX}cleaned_{file_id}.{}", format.extension())
}

/// Key of the cleaning report for a file id.
pub fn report_key(file_id: &str) -> String {
    format!("{PROCESSED_PREFIX}cleaned_{file_id}.report.json")
}
