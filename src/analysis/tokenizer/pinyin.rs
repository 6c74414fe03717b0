//! Pinyin tokenizer family.
//!
//! All seven variants run the same transliteration step from
//! [`crate::pinyin`] and differ only in how the resulting units are
//! projected into tokens:
//!
//! | scheme                 | tokens                                   |
//! |------------------------|------------------------------------------|
//! | `pinyin`               | one per unit, full syllable              |
//! | `pinyin-head`          | one per unit, first letter               |
//! | `pinyin-fuzzy`         | one per unit, fuzzy syllable             |
//! | `pinyin-stream`        | latin input split into syllables         |
//! | `pinyin-keyword`       | one token, syllables concatenated        |
//! | `pinyin-head-keyword`  | one token, head letters concatenated     |
//! | `pinyin-fuzzy-keyword` | one token, fuzzy syllables concatenated  |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::{HanlexError, Result};
use crate::pinyin::{PinyinDict, PinyinUnit, Transliteration, split_syllables, transliterate};

/// Projection applied to the transliterated units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinyinMode {
    /// Full syllables.
    Full,
    /// Head letters.
    Head,
    /// Fuzzy-merged syllables.
    Fuzzy,
    /// Latin pinyin stream split into syllables.
    Stream,
    /// Concatenated full syllables.
    Keyword,
    /// Concatenated head letters.
    HeadKeyword,
    /// Concatenated fuzzy syllables.
    FuzzyKeyword,
}

impl PinyinMode {
    /// Every mode, in registration order.
    pub const ALL: [PinyinMode; 7] = [
        PinyinMode::Full,
        PinyinMode::Head,
        PinyinMode::Fuzzy,
        PinyinMode::Stream,
        PinyinMode::Keyword,
        PinyinMode::HeadKeyword,
        PinyinMode::FuzzyKeyword,
    ];

    /// Scheme name of this mode.
    pub fn scheme_name(&self) -> &'static str {
        match self {
            PinyinMode::Full => "pinyin",
            PinyinMode::Head => "pinyin-head",
            PinyinMode::Fuzzy => "pinyin-fuzzy",
            PinyinMode::Stream => "pinyin-stream",
            PinyinMode::Keyword => "pinyin-keyword",
            PinyinMode::HeadKeyword => "pinyin-head-keyword",
            PinyinMode::FuzzyKeyword => "pinyin-fuzzy-keyword",
        }
    }

    fn token_type(&self) -> TokenType {
        match self {
            PinyinMode::Head | PinyinMode::HeadKeyword => TokenType::PinyinHead,
            PinyinMode::Fuzzy | PinyinMode::FuzzyKeyword => TokenType::PinyinFuzzy,
            _ => TokenType::Pinyin,
        }
    }
}

impl fmt::Display for PinyinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme_name())
    }
}

impl FromStr for PinyinMode {
    type Err = HanlexError;

    fn from_str(s: &str) -> Result<Self> {
        PinyinMode::ALL
            .into_iter()
            .find(|mode| mode.scheme_name() == s)
            .ok_or_else(|| HanlexError::unknown_scheme(s))
    }
}

/// Pinyin tokenizer for one [`PinyinMode`].
#[derive(Clone, Debug)]
pub struct PinyinTokenizer {
    mode: PinyinMode,
    dict: Arc<PinyinDict>,
}

impl PinyinTokenizer {
    /// Create a tokenizer without override entries.
    pub fn new(mode: PinyinMode) -> Self {
        Self::with_dict(mode, Arc::new(PinyinDict::new()))
    }

    /// Create a tokenizer using the given override dictionary.
    pub fn with_dict(mode: PinyinMode, dict: Arc<PinyinDict>) -> Self {
        PinyinTokenizer { mode, dict }
    }

    /// The projection mode.
    pub fn mode(&self) -> PinyinMode {
        self.mode
    }

    fn per_unit<F>(&self, units: &[PinyinUnit], project: F) -> Vec<Token>
    where
        F: Fn(&PinyinUnit) -> String,
    {
        let mut tokens = Vec::with_capacity(units.len());
        let mut last_position = None;
        for unit in units {
            let increment = match last_position {
                Some(previous) => unit.position - previous,
                None => 1,
            };
            last_position = Some(unit.position);
            tokens.push(
                Token::with_offsets(project(unit), unit.position, unit.start, unit.end)
                    .with_position_increment(increment)
                    .with_token_type(self.mode.token_type()),
            );
        }
        tokens
    }

    fn keyword(&self, text: &str, joined: String, syllables: Vec<String>) -> Vec<Token> {
        if joined.is_empty() {
            return Vec::new();
        }
        vec![
            Token::with_offsets(joined, 0, 0, text.len())
                .with_token_type(self.mode.token_type())
                .with_syllables(syllables),
        ]
    }

    fn stream(&self, text: &str) -> Vec<Token> {
        let lower = text.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if !bytes[i].is_ascii_lowercase() {
                i += 1;
                continue;
            }
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_lowercase() {
                i += 1;
            }
            let mut offset = start;
            for syllable in split_syllables(&lower[start..i]) {
                let position = tokens.len();
                tokens.push(
                    Token::with_offsets(syllable, position, offset, offset + syllable.len())
                        .with_token_type(TokenType::Pinyin),
                );
                offset += syllable.len();
            }
        }
        tokens
    }

    fn transliterate(&self, text: &str) -> Transliteration {
        transliterate(text, &self.dict)
    }
}

impl Tokenizer for PinyinTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }

        let tokens = match self.mode {
            PinyinMode::Stream => self.stream(text),
            PinyinMode::Full => self.per_unit(self.transliterate(text).units(), |u| u.text.clone()),
            PinyinMode::Head => {
                self.per_unit(self.transliterate(text).units(), |u| u.head().to_string())
            }
            PinyinMode::Fuzzy => self.per_unit(self.transliterate(text).units(), PinyinUnit::fuzzy),
            PinyinMode::Keyword => {
                let transliteration = self.transliterate(text);
                self.keyword(text, transliteration.as_string(""), transliteration.syllables())
            }
            PinyinMode::HeadKeyword => {
                self.keyword(text, self.transliterate(text).as_head_string(""), Vec::new())
            }
            PinyinMode::FuzzyKeyword => {
                self.keyword(text, self.transliterate(text).as_fuzzy_string(""), Vec::new())
            }
        };

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        self.mode.scheme_name()
    }
}
