//! # Hanlex
//!
//! Pluggable multi-scheme Chinese tokenization and analysis.
//!
//! ## Features
//!
//! - Dictionary and HMM word segmentation
//! - Seven pinyin tokenizer variants with fuzzy matching
//! - Hash and issue-number tokenizers
//! - Analyzer pipelines built from named filter stages
//! - Background dictionary synchronization with atomic swaps
//! - TextRank sentence summaries for search hits

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod pinyin;
pub mod plugin;
pub mod registry;
pub mod resource;
pub mod summary;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, FilterSpec, PipelineAnalyzer};
    pub use crate::analysis::token::{Token, TokenStream, TokenType};
    pub use crate::analysis::tokenizer::Tokenizer;
    pub use crate::config::PluginSettings;
    pub use crate::error::{HanlexError, Result};
    pub use crate::plugin::Plugin;
    pub use crate::registry::{AnalyzerRegistry, TokenizerConfig, TokenizerRegistry};
    pub use crate::summary::{SummaryOutcome, SummaryRequest, summarize};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
