//! Token types and utilities for text analysis.
//!
//! This module defines the core data structures for representing text tokens,
//! which are the units that flow through the analysis pipeline.
//!
//! # Core Types
//!
//! - [`Token`] - A single analyzed token with text, position and offsets
//! - [`TokenType`] - Classification of token content (word, pinyin, number, hash)
//! - [`TokenStream`] - Type alias for boxed iterator of tokens
//!
//! # Positions
//!
//! Tokens carry both an absolute `position` and a `position_increment`.
//! Expansion filters emit extra tokens at the same position with an
//! increment of 0:
//!
//! ```text
//! Input: "张三"  (pinyin + fuzzy-pinyin)
//!
//!   Position 0: "zhang" (pos_inc=1)
//!   Position 0: "zan"   (pos_inc=0)  <- fuzzy variant
//!   Position 1: "san"   (pos_inc=1)
//! ```
//!
//! # Examples
//!
//! ```
//! use hanlex::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("中国", 0, 0, 6).with_token_type(TokenType::Word);
//! assert_eq!(token.text, "中国");
//! assert_eq!(token.end_offset, 6);
//! assert_eq!(token.token_type, TokenType::Word);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
///
/// # Fields
///
/// - `text` - The token's text content
/// - `position` - Position in the token stream (0-based)
/// - `start_offset` / `end_offset` - Byte offsets in the original text
/// - `position_increment` - Position relative to the previous token (default: 1)
/// - `token_type` - Classification of the token content
/// - `syllables` - Pinyin syllables a keyword token concatenates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Position increment from the previous token (default: 1).
    ///
    /// - 1: next position
    /// - 0: same position as the previous token (expansions)
    /// - >1: skipped positions (untransliterable characters)
    pub position_increment: usize,

    /// Token type classification
    pub token_type: TokenType,

    /// Syllables joined into `text` by a pinyin keyword token; empty for
    /// every other token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syllables: Vec<String>,
}

/// Token type classification for different kinds of tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// A segmented word
    Word,
    /// Full pinyin syllable or concatenation
    Pinyin,
    /// Pinyin head letter(s)
    PinyinHead,
    /// Fuzzy-merged pinyin
    PinyinFuzzy,
    /// Numeric values
    Num,
    /// Run of CJK characters
    Cjk,
    /// Latin letters and digits
    Alphanum,
    /// Punctuation marks
    Punctuation,
    /// Stable hash of the whole input
    Hash,
}

impl TokenType {
    /// Whether this type belongs to the pinyin family.
    pub fn is_pinyin(&self) -> bool {
        matches!(
            self,
            TokenType::Pinyin | TokenType::PinyinHead | TokenType::PinyinFuzzy
        )
    }
}

impl Token {
    /// Create a new word token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            position_increment: 1,
            token_type: TokenType::Word,
            syllables: Vec::new(),
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            position_increment: 1,
            token_type: TokenType::Word,
            syllables: Vec::new(),
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    /// Set the position increment.
    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }

    /// Set the syllables this token concatenates.
    pub fn with_syllables(mut self, syllables: Vec<String>) -> Self {
        self.syllables = syllables;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}

/// Check the ordering invariants of a single tokenizer's output: offsets are
/// in bounds, spans do not overlap and positions never decrease.
pub fn is_well_formed(tokens: &[Token]) -> bool {
    let mut last_end = 0;
    let mut last_position = None;
    for token in tokens {
        if token.start_offset > token.end_offset || token.start_offset < last_end {
            return false;
        }
        if let Some(previous) = last_position {
            if token.position < previous {
                return false;
            }
        }
        last_end = token.end_offset;
        last_position = Some(token.position);
    }
    true
}
