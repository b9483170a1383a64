//! CLI argument definitions for the sales cleaner.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sales-clean",
    version,
    about = "Clean raw sales extracts into schema-conformant JSON",
    long_about = "Clean raw sales extracts into schema-conformant JSON.\n\n\
                  Applies the ordered cleaning rules to every row, stores the\n\
                  cleaned artifact with a report of every dropped row, and serves\n\
                  previously cleaned artifacts by file id."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean a CSV extract and store the result.
    Clean(CleanArgs),

    /// Print a previously cleaned artifact.
    Show(ShowArgs),

    /// List the active cleaning rules.
    Rules(RulesArgs),
}

/// Options shared by commands that build a rule chain.
#[derive(Args)]
pub struct ChainArgs {
    /// Cleaning configuration file (TOML). Defaults apply when absent.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Leave a rule out of the chain (repeatable).
    #[arg(long = "disable-rule", value_name = "ID")]
    pub disable_rule: Vec<u8>,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// CSV extract to clean.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Artifact store directory.
    #[arg(long = "store", value_name = "DIR", default_value = "store")]
    pub store: PathBuf,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// Worker threads for stateless rules (overrides the config file).
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Clean and report without storing anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write cleaned output as CSV instead of JSON.
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// File id of the cleaned artifact (source file name without `.csv`).
    #[arg(value_name = "FILE_ID")]
    pub file_id: String,

    /// Artifact store directory.
    #[arg(long = "store", value_name = "DIR", default_value = "store")]
    pub store: PathBuf,
}

#[derive(Parser)]
pub struct RulesArgs {
    #[command(flatten)]
    pub chain: ChainArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
