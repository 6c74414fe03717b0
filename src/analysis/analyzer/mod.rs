//! Analyzers combine a tokenizer with an ordered chain of filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Token Stream
//! ```
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use hanlex::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//! use hanlex::analysis::token_filter::LowercaseFilter;
//! use hanlex::analysis::tokenizer::IssueTokenizer;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(IssueTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()));
//! let tokens: Vec<_> = analyzer.analyze("第12号").unwrap().collect();
//! assert_eq!(tokens.len(), 3);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod pipeline;

pub use pipeline::{FilterSpec, PipelineAnalyzer};

/// Trait for analyzers that turn text into a token stream.
pub trait Analyzer: Send + Sync {
    /// Analyze `text`. An error from the tokenizer or any filter stage aborts
    /// the call; no partial stream is returned.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// The analyzer name.
    fn name(&self) -> &str;

    /// Downcasting support.
    fn as_any(&self) -> &dyn std::any::Any;
}
