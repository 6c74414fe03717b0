//! Segmentation corrections.
//!
//! A rule such as `第几/套房` forces a cut: wherever the segmenter produces a
//! run of words that together spell `第几套房`, the run is replaced by the
//! pieces between the slashes. A rule only applies when its text starts and
//! ends on word boundaries, so it never tears a neighbouring word apart.

use ahash::AHashMap;

use crate::error::{HanlexError, Result};

/// Correction rules keyed by the text they rewrite.
#[derive(Clone, Debug, Default)]
pub struct CorrectionDict {
    // text -> byte length of each piece
    rules: AHashMap<String, Vec<usize>>,
    max_bytes: usize,
}

impl CorrectionDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slash separated rule (`"长江/大桥"`). Whitespace around pieces
    /// is ignored; a rule needs at least two pieces.
    pub fn insert(&mut self, rule: &str) -> Result<()> {
        let pieces: Vec<&str> = rule
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if pieces.len() < 2 {
            return Err(HanlexError::analysis(format!(
                "correction rule '{rule}' needs at least two pieces separated by '/'"
            )));
        }
        let text = pieces.concat();
        self.max_bytes = self.max_bytes.max(text.len());
        self.rules
            .insert(text, pieces.iter().map(|p| p.len()).collect());
        Ok(())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the dictionary holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite a segmentation of `text`.
    ///
    /// `words` are contiguous byte ranges in order. At each word the longest
    /// rule spanning whole words wins; unmatched words pass through.
    pub fn apply(&self, text: &str, words: &[(usize, usize)]) -> Vec<(usize, usize)> {
        if self.rules.is_empty() {
            return words.to_vec();
        }
        let mut out = Vec::with_capacity(words.len());
        let mut i = 0;
        while i < words.len() {
            let start = words[i].0;
            let mut matched = None;
            for (j, &(_, end)) in words.iter().enumerate().skip(i) {
                if end - start > self.max_bytes {
                    break;
                }
                if let Some(pieces) = self.rules.get(&text[start..end]) {
                    matched = Some((j, pieces));
                }
            }
            match matched {
                Some((last, pieces)) => {
                    let mut at = start;
                    for len in pieces {
                        out.push((at, at + len));
                        at += len;
                    }
                    i = last + 1;
                }
                None => {
                    out.push(words[i]);
                    i += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str, words: &[&str]) -> Vec<(usize, usize)> {
        let mut at = 0;
        words
            .iter()
            .map(|w| {
                let span = (at, at + w.len());
                at += w.len();
                assert_eq!(&text[span.0..span.1], *w);
                span
            })
            .collect()
    }

    fn texts<'a>(text: &'a str, spans: &[(usize, usize)]) -> Vec<&'a str> {
        spans.iter().map(|&(s, e)| &text[s..e]).collect()
    }

    #[test]
    fn test_insert() {
        let mut dict = CorrectionDict::new();
        dict.insert("第几/套房").unwrap();
        dict.insert(" 长江 / 大桥 ").unwrap();
        assert_eq!(dict.len(), 2);

        assert!(dict.insert("套房").is_err());
        assert!(dict.insert("套房/").is_err());
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_apply_merges_and_splits() {
        let mut dict = CorrectionDict::new();
        dict.insert("第几/套房").unwrap();

        let text = "这是第几套房子";
        let words = spans(text, &["这是", "第几套", "房子"]);
        // 第几套房 ends inside 房子, so nothing changes
        assert_eq!(texts(text, &dict.apply(text, &words)), vec!["这是", "第几套", "房子"]);

        let text = "买第几套房";
        let words = spans(text, &["买", "第几套", "房"]);
        assert_eq!(texts(text, &dict.apply(text, &words)), vec!["买", "第几", "套房"]);
    }

    #[test]
    fn test_longest_rule_wins() {
        let mut dict = CorrectionDict::new();
        dict.insert("南京/市长").unwrap();
        dict.insert("南京市/长江/大桥").unwrap();

        let text = "南京市长江大桥";
        let words = spans(text, &["南京", "市长", "江大桥"]);
        assert_eq!(
            texts(text, &dict.apply(text, &words)),
            vec!["南京市", "长江", "大桥"]
        );
    }

    #[test]
    fn test_empty_dict_is_identity() {
        let text = "你好";
        let words = spans(text, &["你", "好"]);
        assert_eq!(CorrectionDict::new().apply(text, &words), words);
    }
}
