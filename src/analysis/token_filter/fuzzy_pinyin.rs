//! Fuzzy pinyin expansion filter.
//!
//! For every pinyin token whose fuzzy form differs, the filter emits an extra
//! token right after it, at the same position (increment 0) and with the same
//! offsets, so that `zhang` also matches a query typed as `zang`.
//!
//! The fuzzy form is the one the `pinyin-fuzzy` schemes produce: a keyword
//! token folds the syllables it was built from rather than re-splitting its
//! text, and latin words that do not spell a syllable are kept.

use crate::analysis::token::{TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::Result;
use crate::pinyin::fuzzy_unit;

/// Adds fuzzy variants of pinyin tokens.
#[derive(Clone, Debug, Default)]
pub struct FuzzyPinyinFilter;

impl FuzzyPinyinFilter {
    /// Create a new fuzzy pinyin filter.
    pub fn new() -> Self {
        FuzzyPinyinFilter
    }
}

impl Filter for FuzzyPinyinFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut expanded = Vec::new();
        for token in tokens {
            let variant = match token.token_type {
                TokenType::Pinyin => {
                    let fuzzy: String = if token.syllables.is_empty() {
                        fuzzy_unit(&token.text)
                    } else {
                        token.syllables.iter().map(|s| fuzzy_unit(s)).collect()
                    };
                    (fuzzy != token.text).then(|| {
                        token
                            .with_text(fuzzy)
                            .with_syllables(Vec::new())
                            .with_position_increment(0)
                            .with_token_type(TokenType::PinyinFuzzy)
                    })
                }
                _ => None,
            };
            expanded.push(token);
            expanded.extend(variant);
        }
        Ok(Box::new(expanded.into_iter()))
    }

    fn name(&self) -> &'static str {
        "fuzzy-pinyin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn pinyin(text: &str, position: usize) -> Token {
        Token::new(text, position).with_token_type(TokenType::Pinyin)
    }

    fn expand(tokens: Vec<Token>) -> Vec<Token> {
        FuzzyPinyinFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect()
    }

    #[test]
    fn test_expansion() {
        let result = expand(vec![pinyin("zhang", 0), pinyin("san", 1), Token::new("张三", 2)]);
        let texts: Vec<_> = result.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts, vec!["zhang", "zan", "san", "张三"]);
        assert_eq!(result[1].position, 0);
        assert_eq!(result[1].position_increment, 0);
        assert_eq!(result[1].token_type, TokenType::PinyinFuzzy);
    }

    #[test]
    fn test_keyword_token_uses_its_syllables() {
        let keyword = pinyin("jinan", 0).with_syllables(vec!["ji".into(), "nan".into()]);
        let result = expand(vec![keyword]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].text, "jilan");
        assert!(result[1].syllables.is_empty());
    }

    #[test]
    fn test_latin_words_not_folded() {
        let result = expand(vec![pinyin("iphone", 0), pinyin("15", 1)]);
        assert_eq!(result.len(), 2);
    }
}
