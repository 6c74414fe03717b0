//! Punctuation filter implementation.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::stop::drop_with_gaps;
use crate::error::Result;

/// Whether `text` consists only of punctuation and symbols.
///
/// Empty text and whitespace are not punctuation.
pub fn is_punctuation(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// A filter that removes punctuation and symbol tokens.
#[derive(Clone, Debug, Default)]
pub struct PunctuationFilter;

impl PunctuationFilter {
    /// Create a new punctuation filter.
    pub fn new() -> Self {
        PunctuationFilter
    }
}

impl Filter for PunctuationFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = drop_with_gaps(tokens, |token| is_punctuation(&token.text));
        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "punctuation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_is_punctuation() {
        assert!(is_punctuation("，"));
        assert!(is_punctuation("〔"));
        assert!(is_punctuation("?!"));
        assert!(!is_punctuation("a,"));
        assert!(!is_punctuation("北"));
        assert!(!is_punctuation(" "));
        assert!(!is_punctuation(""));
    }

    #[test]
    fn test_punctuation_filter() {
        let tokens = vec![
            Token::new("你好", 0),
            Token::new("，", 1),
            Token::new("世界", 2),
        ];
        let result: Vec<Token> = PunctuationFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].text, "世界");
        assert_eq!(result[1].position_increment, 2);
    }
}
