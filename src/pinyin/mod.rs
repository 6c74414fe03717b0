//! Core pinyin transliteration shared by every pinyin tokenizer variant.
//!
//! Text is converted once into a [`Transliteration`], a sequence of
//! [`PinyinUnit`]s, and each tokenizer variant is a projection of it
//! (full syllables, head letters, fuzzy syllables, or their keyword
//! concatenations). Keeping a single conversion step guarantees that all
//! variants agree on the romanization of a given text.
//!
//! Conversion rules, applied left to right:
//!
//! 1. The longest entry of the [`PinyinDict`] override dictionary that
//!    matches at the current character wins (`朝朝盈 → zhao zhao yin`).
//! 2. Otherwise a Han character takes its default reading.
//! 3. A run of ASCII letters and digits becomes one lowercase unit. A run
//!    that spells a syllable is treated as pinyin by the fuzzy projection.
//! 4. Anything else produces no unit but still occupies a position slot.
//!
//! ```
//! use hanlex::pinyin::{transliterate, PinyinDict};
//!
//! let t = transliterate("北京", &PinyinDict::default());
//! let full: Vec<_> = t.units().iter().map(|u| u.text.as_str()).collect();
//! assert_eq!(full, vec!["bei", "jing"]);
//! ```

pub mod fuzzy;
pub mod split;

use ahash::AHashMap;
use pinyin::ToPinyin;

use crate::error::{HanlexError, Result};

pub use fuzzy::{fuzzy_syllable, fuzzy_unit};
pub use split::{is_syllable, split_syllables};

/// One transliterated slot of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinyinUnit {
    /// Lowercase romanization without tone marks.
    pub text: String,
    /// Byte offset of the source span start.
    pub start: usize,
    /// Byte offset of the source span end.
    pub end: usize,
    /// Slot index; slots without a unit leave gaps.
    pub position: usize,
}

impl PinyinUnit {
    /// First letter of the romanization.
    pub fn head(&self) -> &str {
        match self.text.char_indices().nth(1) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// Fuzzy form of the romanization, see [`fuzzy_unit`].
    pub fn fuzzy(&self) -> String {
        fuzzy_unit(&self.text)
    }
}

/// The result of transliterating a text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transliteration {
    units: Vec<PinyinUnit>,
}

impl Transliteration {
    /// All produced units in source order.
    pub fn units(&self) -> &[PinyinUnit] {
        &self.units
    }

    /// Whether no unit was produced.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Full syllables joined by `sep`.
    pub fn as_string(&self, sep: &str) -> String {
        self.join(sep, |u| u.text.clone())
    }

    /// Head letters joined by `sep`.
    pub fn as_head_string(&self, sep: &str) -> String {
        self.join(sep, |u| u.head().to_string())
    }

    /// Full syllable of every unit, in order.
    pub fn syllables(&self) -> Vec<String> {
        self.units.iter().map(|u| u.text.clone()).collect()
    }

    /// Fuzzy syllables joined by `sep`.
    pub fn as_fuzzy_string(&self, sep: &str) -> String {
        self.join(sep, PinyinUnit::fuzzy)
    }

    fn join<F: Fn(&PinyinUnit) -> String>(&self, sep: &str, project: F) -> String {
        self.units.iter().map(project).collect::<Vec<_>>().join(sep)
    }
}

/// Override dictionary mapping words to explicit syllable sequences.
///
/// Used for polyphonic characters and proper names whose default reading
/// is wrong. Entries come from the `pinyin` resource module.
#[derive(Clone, Debug, Default)]
pub struct PinyinDict {
    entries: AHashMap<String, Vec<String>>,
    max_chars: usize,
}

impl PinyinDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry from a comma separated syllable list (`"zhao,zhao,yin"`).
    ///
    /// The number of syllables must equal the number of characters.
    pub fn insert(&mut self, text: &str, pinyin: &str) -> Result<()> {
        let syllables: Vec<String> = pinyin
            .split(',')
            .map(|s| s.trim().to_lowercase().replace('ü', "v"))
            .filter(|s| !s.is_empty())
            .collect();
        let chars = text.chars().count();
        if chars == 0 || syllables.len() != chars {
            return Err(HanlexError::analysis(format!(
                "pinyin entry '{text}' has {chars} characters but {} syllables",
                syllables.len()
            )));
        }
        self.max_chars = self.max_chars.max(chars);
        self.entries.insert(text.to_string(), syllables);
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest entry matching at the start of `chars`, as (char count, syllables).
    fn longest_match(&self, text: &str, chars: &[(usize, char)]) -> Option<(usize, &[String])> {
        if self.entries.is_empty() {
            return None;
        }
        let base = chars.first()?.0;
        for len in (1..=self.max_chars.min(chars.len())).rev() {
            let end = chars.get(len).map(|(idx, _)| *idx).unwrap_or(text.len());
            if let Some(syllables) = self.entries.get(&text[base..end]) {
                return Some((len, syllables.as_slice()));
            }
        }
        None
    }
}

/// Default reading of a single character, if it is a Han character.
pub fn char_pinyin(c: char) -> Option<String> {
    c.to_pinyin().map(|p| p.plain().replace('ü', "v"))
}

/// Transliterate `text` using `dict` overrides.
pub fn transliterate(text: &str, dict: &PinyinDict) -> Transliteration {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_end = |i: usize| chars.get(i).map(|(idx, _)| *idx).unwrap_or(text.len());

    let mut units = Vec::new();
    let mut position = 0;
    let mut i = 0;
    while i < chars.len() {
        let (start, c) = chars[i];

        if let Some((len, syllables)) = dict.longest_match(text, &chars[i..]) {
            for (k, syllable) in syllables.iter().enumerate() {
                units.push(PinyinUnit {
                    text: syllable.clone(),
                    start: chars[i + k].0,
                    end: byte_end(i + k + 1),
                    position,
                });
                position += 1;
            }
            i += len;
            continue;
        }

        if c.is_ascii_alphanumeric() {
            let mut j = i;
            while j < chars.len() && chars[j].1.is_ascii_alphanumeric() {
                j += 1;
            }
            let end = byte_end(j);
            units.push(PinyinUnit {
                text: text[start..end].to_ascii_lowercase(),
                start,
                end,
                position,
            });
            position += 1;
            i = j;
            continue;
        }

        if let Some(syllable) = char_pinyin(c) {
            units.push(PinyinUnit {
                text: syllable,
                start,
                end: byte_end(i + 1),
                position,
            });
        }
        position += 1;
        i += 1;
    }

    Transliteration { units }
}
