//! Issue number tokenizer.
//!
//! Official document numbers such as `沪人社规〔2017〕43号` are indexed as
//! their CJK runs and digit runs, dropping brackets and other punctuation.

use std::sync::LazyLock;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

static ISSUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{4E00}-\x{9FA5}\x{FE30}-\x{FFA0}]+|[0-9]+")
        .expect("issue pattern is valid")
});

/// Emits one token per CJK run or digit run, leftmost first.
#[derive(Clone, Debug, Default)]
pub struct IssueTokenizer;

impl IssueTokenizer {
    /// Create a new issue tokenizer.
    pub fn new() -> Self {
        IssueTokenizer
    }
}

impl Tokenizer for IssueTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = ISSUE_PATTERN
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                let token_type = if mat.as_str().bytes().all(|b| b.is_ascii_digit()) {
                    TokenType::Num
                } else {
                    TokenType::Cjk
                };
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
                    .with_token_type(token_type)
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "issue"
    }
}
