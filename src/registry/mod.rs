//! Name-based lookup of tokenizers and analyzers.
//!
//! A host resolves the scheme names found in its index settings through a
//! [`TokenizerRegistry`]; named filter chains go through an
//! [`AnalyzerRegistry`] layered on top of it.

pub mod analyzer;
pub mod tokenizer;

pub use analyzer::{AnalyzerDefinition, AnalyzerRegistry};
pub use tokenizer::{Predicate, SchemeFactory, TokenizerConfig, TokenizerRegistry};
