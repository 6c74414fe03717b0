//! Hash tokenizer implementation.

use sha2::{Digest, Sha256};

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// A tokenizer that emits a single token holding the SHA-256 of the input.
///
/// Useful for exact-match indexing of arbitrary long strings: the hex digest
/// is stable across processes and versions.
#[derive(Clone, Debug, Default)]
pub struct HashTokenizer;

impl HashTokenizer {
    /// Create a new hash tokenizer.
    pub fn new() -> Self {
        HashTokenizer
    }

    /// Lowercase hex digest of `text`.
    pub fn digest(text: &str) -> String {
        format!("{:x}", Sha256::digest(text.as_bytes()))
    }
}

impl Tokenizer for HashTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let token = Token::with_offsets(Self::digest(text), 0, 0, text.len())
            .with_token_type(TokenType::Hash);
        Ok(Box::new(std::iter::once(token)))
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}
