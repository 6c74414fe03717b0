//! Token filter implementations for token transformation.
//!
//! Filters receive the stream produced by a tokenizer and may drop,
//! transform or expand tokens. Dropped tokens leave their position behind, so
//! a phrase query across a removed stop word still sees the gap.
//!
//! # Examples
//!
//! ```
//! use hanlex::analysis::token_filter::Filter;
//! use hanlex::analysis::token_filter::lowercase::LowercaseFilter;
//! use hanlex::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// The trait requires `Send + Sync` so one analyzer can serve many threads.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    ///
    /// An error aborts the whole analysis call.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod fuzzy_pinyin;
pub mod limit;
pub mod lowercase;
pub mod punctuation;
pub mod stop;

pub use fuzzy_pinyin::FuzzyPinyinFilter;
pub use limit::LimitFilter;
pub use lowercase::LowercaseFilter;
pub use punctuation::PunctuationFilter;
pub use stop::StopFilter;
