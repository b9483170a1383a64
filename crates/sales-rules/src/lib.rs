//! Sales record cleaning rules.
//!
//! [`RuleChain`] applies the canonical rules from [`rules`] to parsed
//! records and accounts for every drop and alteration in a
//! [`CleaningReport`](sales_model::CleaningReport).

pub mod chain;
pub mod config;
pub mod error;
pub mod rule;
pub mod rules;
pub mod state;

pub use chain::RuleChain;
pub use config::{CleaningConfig, EngineSettings, RuleSettings};
pub use error::{Result, RuleError};
pub use rule::{Rule, RuleCategory, RuleMetadata};
pub use rules::{CANONICAL_RULE_IDS, canonical_rules};
pub use state::RunState;
