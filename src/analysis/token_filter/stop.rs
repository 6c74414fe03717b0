//! Stop filter implementation.
//!
//! Removes function words that carry no search relevance. The default list
//! covers common Chinese particles, pronouns and conjunctions together with
//! the usual English stop words, since mixed-script text is the norm.
//!
//! # Examples
//!
//! ```
//! use hanlex::analysis::token_filter::Filter;
//! use hanlex::analysis::token_filter::stop::StopFilter;
//! use hanlex::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![Token::new("我", 0), Token::new("的", 1), Token::new("书", 2)];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "书");
//! assert_eq!(result[0].position, 2);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

const DEFAULT_CHINESE_STOP_WORDS: &[&str] = &[
    "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也",
    "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那", "他",
    "她", "它", "们", "我们", "你们", "他们", "之", "与", "及", "其", "或", "而", "并", "但",
    "被", "把", "让", "从", "对", "向", "以", "于", "为", "由", "吗", "呢", "吧", "啊", "呀",
    "哦", "嗯", "地", "得", "所", "等", "这个", "那个", "这些", "那些", "什么", "因为", "所以",
    "如果", "虽然", "但是", "而且", "或者", "还是", "已经", "可以", "没", "又", "再", "还",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// Default Chinese stop words as a HashSet.
pub static DEFAULT_CHINESE_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_CHINESE_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// Removed tokens leave a position gap; the next surviving token carries the
/// skipped increments in its `position_increment`.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a stop filter with the default Chinese and English words.
    pub fn new() -> Self {
        let words = DEFAULT_CHINESE_STOP_WORDS_SET
            .iter()
            .chain(DEFAULT_ENGLISH_STOP_WORDS_SET.iter())
            .cloned()
            .collect();
        Self::with_stop_words(words)
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    /// Create a new stop filter from a list of stop words.
    ///
    /// ```
    /// use hanlex::analysis::token_filter::stop::StopFilter;
    ///
    /// let filter = StopFilter::from_words(vec!["嗯", "啊"]);
    /// assert_eq!(filter.len(), 2);
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = drop_with_gaps(tokens, |token| self.is_stop_word(&token.text));
        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

/// Remove tokens matching `drop`, folding their increments into the next
/// kept token so positions keep their original values.
pub(crate) fn drop_with_gaps<F>(tokens: TokenStream, drop: F) -> Vec<Token>
where
    F: Fn(&Token) -> bool,
{
    let mut kept = Vec::new();
    let mut carried = 0;
    for token in tokens {
        if drop(&token) {
            carried += token.position_increment;
            continue;
        }
        let increment = token.position_increment + carried;
        carried = 0;
        kept.push(token.with_position_increment(increment));
    }
    kept
}
