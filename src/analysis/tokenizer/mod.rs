//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step in the analysis pipeline and split input
//! text into tokens.
//!
//! # Available Tokenizers
//!
//! - [`segment::SegmentTokenizer`] - Chinese word segmentation (core and CWS)
//! - [`pinyin::PinyinTokenizer`] - Pinyin transliteration in seven variants
//! - [`hash::HashTokenizer`] - One token holding a stable hash of the input
//! - [`issue::IssueTokenizer`] - CJK runs and digit runs of issue numbers
//!
//! # Examples
//!
//! ```
//! use hanlex::analysis::tokenizer::Tokenizer;
//! use hanlex::analysis::tokenizer::issue::IssueTokenizer;
//!
//! let tokenizer = IssueTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("issue #42 abc").unwrap().collect();
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].text, "42");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::{HanlexError, Result};

/// Trait for tokenizers that convert text into tokens.
///
/// Every call re-scans the input from the start, so one instance can serve
/// any number of concurrent calls. Empty input yields an empty stream.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Tokenize raw bytes, failing on invalid UTF-8.
    fn tokenize_bytes(&self, bytes: &[u8]) -> Result<TokenStream> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            HanlexError::malformed_input(format!(
                "invalid UTF-8 at byte {}",
                e.valid_up_to()
            ))
        })?;
        self.tokenize(text)
    }
}

impl std::fmt::Debug for dyn Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").field("name", &self.name()).finish()
    }
}

pub mod hash;
pub mod issue;
pub mod pinyin;
pub mod segment;

pub use hash::HashTokenizer;
pub use issue::IssueTokenizer;
pub use pinyin::{PinyinMode, PinyinTokenizer};
pub use segment::{LexerKind, SegmentMode, SegmentOptions, SegmentTokenizer};
