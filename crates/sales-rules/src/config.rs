//! Tunable cleaning configuration.
//!
//! Loaded from TOML. Every key is optional; omitted keys take the defaults
//! below, and a missing file means the default configuration.
//!
//! ```toml
//! [rules]
//! disabled = [19]
//! product_code_max_len = 15
//! product_line_max_len = 30
//! status_default = "UNKNOWN"
//! city_default = "SIN CIUDAD"
//!
//! [rules.status_corrections]
//! DLEIVERED = "DELIVERED"
//!
//! [engine]
//! workers = 1
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};

const DEFAULT_PRODUCT_CODE_MAX_LEN: usize = 15;
const DEFAULT_PRODUCT_LINE_MAX_LEN: usize = 30;
const DEFAULT_STATUS: &str = "UNKNOWN";
const DEFAULT_CITY: &str = "SIN CIUDAD";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub rules: RuleSettings,
    pub engine: EngineSettings,
}

/// Tuning for individual rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Rule numbers to leave out of the chain.
    pub disabled: BTreeSet<u8>,
    pub product_code_max_len: usize,
    pub product_line_max_len: usize,
    /// Replacement for a missing STATUS.
    pub status_default: String,
    /// Replacement for a missing CITY.
    pub city_default: String,
    /// Exact (case-sensitive) STATUS rewrites.
    pub status_corrections: BTreeMap<String, String>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            disabled: BTreeSet::new(),
            product_code_max_len: DEFAULT_PRODUCT_CODE_MAX_LEN,
            product_line_max_len: DEFAULT_PRODUCT_LINE_MAX_LEN,
            status_default: DEFAULT_STATUS.to_string(),
            city_default: DEFAULT_CITY.to_string(),
            status_corrections: BTreeMap::from([(
                "DLEIVERED".to_string(),
                "DELIVERED".to_string(),
            )]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Threads used for the stateless rule segments; 0 and 1 both mean
    /// evaluation on the calling thread.
    pub workers: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl CleaningConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                tracing::info!(path = %path.display(), "loaded cleaning config");
                Ok(config)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(RuleError::ConfigRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Disable additional rules by number.
    pub fn disable_rules(&mut self, ids: impl IntoIterator<Item = u8>) {
        self.rules.disabled.extend(ids);
    }

    pub fn is_rule_disabled(&self, id: u8) -> bool {
        self.rules.disabled.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CleaningConfig::default();
        assert_eq!(config.rules.product_code_max_len, 15);
        assert_eq!(config.rules.product_line_max_len, 30);
        assert_eq!(config.rules.status_default, "UNKNOWN");
        assert_eq!(config.rules.city_default, "SIN CIUDAD");
        assert_eq!(
            config.rules.status_corrections.get("DLEIVERED").map(String::as_str),
            Some("DELIVERED")
        );
        assert_eq!(config.engine.workers, 1);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = CleaningConfig::from_toml_str(
            "[rules]\ndisabled = [19]\ncity_default = \"N/A\"\n\n[engine]\nworkers = 4\n",
        )
        .unwrap();
        assert!(config.is_rule_disabled(19));
        assert_eq!(config.rules.city_default, "N/A");
        assert_eq!(config.rules.status_default, "UNKNOWN");
        assert_eq!(config.engine.workers, 4);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let err = CleaningConfig::from_toml_str("[engine]\nworkers = \"many\"\n").unwrap_err();
        assert!(matches!(err, RuleError::ConfigParse(_)));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = CleaningConfig::default();
        config.disable_rules([3, 19]);
        let text = config.to_toml_string().unwrap();
        let parsed = CleaningConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CleaningConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CleaningConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.toml");
        std::fs::write(&path, "[rules]\nproduct_code_max_len = 10\n").unwrap();
        let config = CleaningConfig::load(&path).unwrap();
        assert_eq!(config.rules.product_code_max_len, 10);
    }
}
