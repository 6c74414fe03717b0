//! Command line argument parsing for the Hanlex CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::analyzer::FilterSpec;

/// Hanlex - Chinese tokenization and analysis toolkit
#[derive(Parser, Debug, Clone)]
#[command(name = "hanlex")]
#[command(about = "Pluggable multi-scheme Chinese tokenization and analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HanlexArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Plugin settings file (JSON)
    #[arg(short, long, value_name = "SETTINGS_FILE", env = "HANLEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Register the CWS schemes regardless of the settings file
    #[arg(long)]
    pub enable_cws: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HanlexArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Tokenize text with one scheme
    Tokenize(TokenizeArgs),

    /// Run text through an analyzer
    Analyze(AnalyzeArgs),

    /// List available tokenizer schemes and analyzers
    Schemes,

    /// Run one resource sync cycle and show the resulting versions
    Sync(SyncArgs),

    /// Summarize the documents of a JSON or JSONL file
    Summarize(SummarizeArgs),
}

/// Arguments for tokenizing
#[derive(Parser, Debug, Clone)]
pub struct TokenizeArgs {
    /// Tokenizer scheme
    #[arg(short, long, default_value = "mynlp")]
    pub scheme: String,

    /// Tokenizer setting as KEY=VALUE (e.g. mode=atom), repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Text to tokenize; read from stdin when absent
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,
}

/// Arguments for analyzing
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Registered analyzer name
    #[arg(short, long, default_value = "mynlp", conflicts_with = "scheme")]
    pub analyzer: String,

    /// Build an ad-hoc analyzer over this tokenizer scheme instead
    #[arg(short, long)]
    pub scheme: Option<String>,

    /// Filter stages for an ad-hoc analyzer, in order
    /// (lowercase, stop, punctuation, fuzzy-pinyin, limit:N)
    #[arg(long = "filter", value_delimiter = ',', requires = "scheme")]
    pub filters: Vec<FilterSpec>,

    /// Text to analyze; read from stdin when absent
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,
}

/// Arguments for a sync cycle
#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    /// Resource server URL, overriding the settings file
    #[arg(long, env = "HANLEX_SERVER")]
    pub server: Option<String>,
}

/// Arguments for summarizing
#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    /// Document file (a JSON object or JSONL), `-` for stdin
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Source field, dotted paths allowed
    #[arg(long, default_value = "content")]
    pub field: String,

    /// Maximum summary length in characters
    #[arg(long, default_value = "100")]
    pub size: usize,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// CSV output (for token lists)
    Csv,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}
