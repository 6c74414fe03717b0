//! Pipeline analyzer that combines a tokenizer and filters.
//!
//! Filters are applied sequentially in the order they were added. Each stage
//! consumes the full output of the previous one, so an error in any stage
//! discards everything produced so far.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use hanlex::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//! use hanlex::analysis::token_filter::{LowercaseFilter, StopFilter};
//! use hanlex::analysis::tokenizer::{SegmentOptions, SegmentTokenizer};
//! use hanlex::resource::Lexicon;
//!
//! let tokenizer = Arc::new(SegmentTokenizer::new(&Lexicon::bundled(), SegmentOptions::default()));
//! let analyzer = PipelineAnalyzer::new(tokenizer)
//!     .add_filter(Arc::new(StopFilter::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .with_name("content");
//!
//! let tokens: Vec<_> = analyzer.analyze("我的iPhone").unwrap().collect();
//! assert!(tokens.iter().any(|t| t.text == "iphone"));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{
    Filter, FuzzyPinyinFilter, LimitFilter, LowercaseFilter, PunctuationFilter, StopFilter,
};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{HanlexError, Result};

/// Declarative description of one filter stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FilterSpec {
    /// Lowercase latin text.
    Lowercase,
    /// Remove stop words; `None` uses the default Chinese and English list.
    Stop {
        /// Custom stop words.
        #[serde(default)]
        words: Option<Vec<String>>,
    },
    /// Remove punctuation tokens.
    Punctuation,
    /// Add fuzzy variants of pinyin tokens.
    FuzzyPinyin,
    /// Keep at most `max` tokens.
    Limit {
        /// Maximum number of tokens.
        max: usize,
    },
}

impl FilterSpec {
    /// Instantiate the filter.
    pub fn build(&self) -> Arc<dyn Filter> {
        match self {
            FilterSpec::Lowercase => Arc::new(LowercaseFilter::new()),
            FilterSpec::Stop { words: None } => Arc::new(StopFilter::new()),
            FilterSpec::Stop { words: Some(words) } => {
                Arc::new(StopFilter::from_words(words.iter().cloned()))
            }
            FilterSpec::Punctuation => Arc::new(PunctuationFilter::new()),
            FilterSpec::FuzzyPinyin => Arc::new(FuzzyPinyinFilter::new()),
            FilterSpec::Limit { max } => Arc::new(LimitFilter::new(*max)),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Lowercase => f.write_str("lowercase"),
            FilterSpec::Stop { .. } => f.write_str("stop"),
            FilterSpec::Punctuation => f.write_str("punctuation"),
            FilterSpec::FuzzyPinyin => f.write_str("fuzzy-pinyin"),
            FilterSpec::Limit { max } => write!(f, "limit:{max}"),
        }
    }
}

/// Parses the short form used on the command line: `lowercase`, `stop`,
/// `punctuation`, `fuzzy-pinyin`, `limit:N`.
impl FromStr for FilterSpec {
    type Err = HanlexError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        match (name.trim(), arg) {
            ("lowercase", None) => Ok(FilterSpec::Lowercase),
            ("stop", None) => Ok(FilterSpec::Stop { words: None }),
            ("punctuation", None) => Ok(FilterSpec::Punctuation),
            ("fuzzy-pinyin", None) => Ok(FilterSpec::FuzzyPinyin),
            ("limit", Some(arg)) => {
                let max = arg.trim().parse::<usize>().map_err(|e| {
                    HanlexError::invalid_config(format!("invalid limit '{arg}': {e}"))
                })?;
                Ok(FilterSpec::Limit { max })
            }
            _ => Err(HanlexError::invalid_config(format!(
                "unknown filter '{s}'"
            ))),
        }
    }
}

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: tokenizer.name().to_string(),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add every filter described by `specs`, in order.
    pub fn with_filters(self, specs: &[FilterSpec]) -> Self {
        specs
            .iter()
            .fold(self, |analyzer, spec| analyzer.add_filter(spec.build()))
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;
    use crate::analysis::tokenizer::{PinyinMode, PinyinTokenizer, SegmentOptions, SegmentTokenizer};
    use crate::resource::Lexicon;

    struct FailingFilter;

    impl Filter for FailingFilter {
        fn filter(&self, _tokens: TokenStream) -> Result<TokenStream> {
            Err(HanlexError::analysis("stage failed"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_pipeline_analyzer() {
        let tokenizer = Arc::new(SegmentTokenizer::new(
            &Lexicon::bundled(),
            SegmentOptions::default(),
        ));
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(StopFilter::from_words(vec!["我"])))
            .add_filter(Arc::new(LowercaseFilter::new()));

        let tokens: Vec<Token> = analyzer.analyze("我来到北京").unwrap().collect();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts, vec!["来到", "北京"]);
        assert_eq!(tokens[0].position, 1);
        assert_eq!(analyzer.name(), "core");
    }

    #[test]
    fn test_filter_order() {
        let tokenizer = Arc::new(PinyinTokenizer::new(PinyinMode::Full));
        let expanded = PipelineAnalyzer::new(tokenizer.clone())
            .with_filters(&[FilterSpec::FuzzyPinyin, FilterSpec::Limit { max: 2 }]);
        let limited = PipelineAnalyzer::new(tokenizer)
            .with_filters(&[FilterSpec::Limit { max: 2 }, FilterSpec::FuzzyPinyin]);

        let a: Vec<String> = expanded.analyze("张三").unwrap().map(|t| t.text).collect();
        let b: Vec<String> = limited.analyze("张三").unwrap().map(|t| t.text).collect();

        assert_eq!(a, vec!["zhang", "zan"]);
        assert_eq!(b, vec!["zhang", "zan", "san"]);
    }

    #[test]
    fn test_failing_stage_aborts() {
        let analyzer = PipelineAnalyzer::new(Arc::new(PinyinTokenizer::new(PinyinMode::Full)))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(FailingFilter));

        assert!(analyzer.analyze("北京").is_err());
    }

    #[test]
    fn test_filter_spec_parsing() {
        assert_eq!("lowercase".parse::<FilterSpec>().unwrap(), FilterSpec::Lowercase);
        assert_eq!(
            "limit:5".parse::<FilterSpec>().unwrap(),
            FilterSpec::Limit { max: 5 }
        );
        assert!("limit".parse::<FilterSpec>().is_err());
        assert!("stem".parse::<FilterSpec>().is_err());

        let spec: FilterSpec =
            serde_json::from_str(r#"{"type":"stop","words":["嗯"]}"#).unwrap();
        assert_eq!(
            spec,
            FilterSpec::Stop {
                words: Some(vec!["嗯".to_string()])
            }
        );
        let spec: FilterSpec = serde_json::from_str(r#"{"type":"fuzzy-pinyin"}"#).unwrap();
        assert_eq!(spec, FilterSpec::FuzzyPinyin);
    }
}
