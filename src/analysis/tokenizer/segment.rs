//! Chinese word segmentation tokenizer.
//!
//! Two lexers share this implementation:
//!
//! - **core**: dictionary segmentation, the maximum-probability path over the
//!   word DAG built from the dictionary.
//! - **cws**: the same path search plus an HMM sequence model that
//!   recognizes words missing from the dictionary. More expensive, only
//!   registered when enabled.
//!
//! Correction rules from the lexicon then force cuts on the best path, and
//! atom mode splits long words further. Punctuation and stop words that are
//! dropped still occupy a position; whitespace does not.
//!
//! The dictionary is taken from a [`Lexicon`] snapshot when the tokenizer is
//! built; a later dictionary sync does not affect existing instances.
//!
//! # Examples
//!
//! ```no_run
//! use hanlex::analysis::tokenizer::Tokenizer;
//! use hanlex::analysis::tokenizer::segment::{SegmentOptions, SegmentTokenizer};
//! use hanlex::resource::Lexicon;
//!
//! let tokenizer = SegmentTokenizer::new(&Lexicon::bundled(), SegmentOptions::default());
//! let words: Vec<_> = tokenizer
//!     .tokenize("我们中出了一个叛徒")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! println!("{words:?}");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jieba_rs::{Jieba, TokenizeMode};
use log::trace;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::punctuation::is_punctuation;
use crate::analysis::token_filter::stop::DEFAULT_CHINESE_STOP_WORDS_SET;
use crate::error::{HanlexError, Result};
use crate::resource::{CorrectionDict, Lexicon};

/// Which segmentation model to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexerKind {
    /// Dictionary only.
    Core,
    /// Dictionary plus HMM sequence model.
    Cws,
}

/// How words are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SegmentMode {
    /// The best segmentation path.
    #[default]
    Top,
    /// Words longer than two characters are split further into
    /// non-overlapping dictionary sub-words.
    Atom,
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMode::Top => f.write_str("top"),
            SegmentMode::Atom => f.write_str("atom"),
        }
    }
}

impl FromStr for SegmentMode {
    type Err = HanlexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(SegmentMode::Top),
            "atom" => Ok(SegmentMode::Atom),
            other => Err(HanlexError::invalid_config(format!(
                "unknown segment mode '{other}', expected 'top' or 'atom'"
            ))),
        }
    }
}

/// Options of a segmentation tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Segmentation model.
    pub lexer: LexerKind,
    /// Emission mode.
    pub mode: SegmentMode,
    /// Drop punctuation tokens.
    pub filter_punctuation: bool,
    /// Drop Chinese stop words.
    pub filter_stopword: bool,
    /// Use synchronized custom words; `false` uses the base dictionary.
    pub custom_word: bool,
    /// Apply synchronized correction rules.
    pub correction: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        SegmentOptions {
            lexer: LexerKind::Core,
            mode: SegmentMode::Top,
            filter_punctuation: true,
            filter_stopword: false,
            custom_word: true,
            correction: true,
        }
    }
}

impl SegmentOptions {
    /// Default options for the given lexer.
    pub fn for_lexer(lexer: LexerKind) -> Self {
        SegmentOptions {
            lexer,
            ..Default::default()
        }
    }
}

/// Word segmentation tokenizer.
#[derive(Clone)]
pub struct SegmentTokenizer {
    segmenter: Arc<Jieba>,
    corrections: Arc<CorrectionDict>,
    options: SegmentOptions,
}

impl SegmentTokenizer {
    /// Build a tokenizer over a lexicon snapshot.
    pub fn new(lexicon: &Lexicon, options: SegmentOptions) -> Self {
        let segmenter = if options.custom_word {
            Arc::clone(lexicon.segmenter())
        } else {
            Lexicon::base_segmenter()
        };
        let corrections = if options.correction {
            Arc::clone(lexicon.corrections())
        } else {
            Arc::new(CorrectionDict::new())
        };
        SegmentTokenizer {
            segmenter,
            corrections,
            options,
        }
    }

    /// The options in use.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    fn use_hmm(&self) -> bool {
        self.options.lexer == LexerKind::Cws
    }

    /// Split a long word into non-overlapping sub-words, as byte ranges
    /// relative to the word.
    fn atoms(&self, word: &str) -> Vec<(usize, usize)> {
        let mut byte_at: Vec<usize> = word.char_indices().map(|(idx, _)| idx).collect();
        let len = byte_at.len();
        byte_at.push(word.len());
        if len <= 2 {
            return vec![(0, word.len())];
        }
        let candidates: Vec<(usize, usize)> = self
            .segmenter
            .tokenize(word, TokenizeMode::Search, false)
            .into_iter()
            .map(|t| (t.start, t.end))
            .filter(|&(start, end)| end - start < len)
            .collect();

        let mut atoms = Vec::new();
        let mut pos = 0;
        while pos < len {
            let end = candidates
                .iter()
                .filter(|&&(start, _)| start == pos)
                .map(|&(_, end)| end)
                .max()
                .unwrap_or(pos + 1);
            atoms.push((byte_at[pos], byte_at[end]));
            pos = end;
        }
        atoms
    }

    fn dropped(&self, word: &str) -> bool {
        (self.options.filter_punctuation && is_punctuation(word))
            || (self.options.filter_stopword && DEFAULT_CHINESE_STOP_WORDS_SET.contains(word))
    }
}

fn classify(word: &str) -> TokenType {
    if word.bytes().all(|b| b.is_ascii_digit()) {
        TokenType::Num
    } else if word.bytes().all(|b| b.is_ascii_alphanumeric()) {
        TokenType::Alphanum
    } else if is_punctuation(word) {
        TokenType::Punctuation
    } else {
        TokenType::Word
    }
}

impl Tokenizer for SegmentTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }

        // char index -> byte offset, with one extra entry for the end
        let mut byte_at: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        byte_at.push(text.len());

        let words: Vec<(usize, usize)> = self
            .segmenter
            .tokenize(text, TokenizeMode::Default, self.use_hmm())
            .into_iter()
            .map(|w| (byte_at[w.start], byte_at[w.end]))
            .collect();
        let words = self.corrections.apply(text, &words);

        let mut tokens = Vec::with_capacity(words.len());
        let mut position = 0;
        let mut last_position: Option<usize> = None;
        for (word_start, word_end) in words {
            let spans = match self.options.mode {
                SegmentMode::Top => vec![(word_start, word_end)],
                SegmentMode::Atom => self
                    .atoms(&text[word_start..word_end])
                    .into_iter()
                    .map(|(start, end)| (word_start + start, word_start + end))
                    .collect(),
            };
            for (start, end) in spans {
                let surface = &text[start..end];
                if surface.trim().is_empty() {
                    continue;
                }
                if !self.dropped(surface) {
                    let increment = last_position.map_or(1, |previous| position - previous);
                    last_position = Some(position);
                    tokens.push(
                        Token::with_offsets(surface, position, start, end)
                            .with_position_increment(increment)
                            .with_token_type(classify(surface)),
                    );
                }
                position += 1;
            }
        }
        trace!("{:?} -> {} tokens", text, tokens.len());

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        match self.options.lexer {
            LexerKind::Core => "core",
            LexerKind::Cws => "cws",
        }
    }
}

impl fmt::Debug for SegmentTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTokenizer")
            .field("options", &self.options)
            .finish()
    }
}
