//! Extractive summaries for search hits.
//!
//! Given a matched document and a [`SummaryRequest`], [`summarize`] produces
//! a derived field `summary-{field}` holding the most central sentences of
//! the requested text field, in document order, up to `size` characters.
//!
//! Sentences are ranked with TextRank: each sentence is a node, edges are
//! weighted by the word overlap of the two sentences, and the stationary
//! score of the weighted PageRank walk ranks them.
//!
//! The extension never fails a search. Missing fields, non-text values and
//! empty text all yield [`SummaryOutcome::Skip`].
//!
//! ```
//! use hanlex::summary::{SummaryOutcome, SummaryRequest, summarize};
//! use serde_json::json;
//!
//! let doc = json!({"title": "无正文"});
//! assert_eq!(summarize(&doc, &SummaryRequest::default()), SummaryOutcome::Skip);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use jieba_rs::Jieba;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token_filter::punctuation::is_punctuation;
use crate::analysis::token_filter::stop::DEFAULT_CHINESE_STOP_WORDS_SET;
use crate::error::{HanlexError, Result};
use crate::resource::Lexicon;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-4;

static DEFAULT_SUMMARIZER: LazyLock<SentenceSummarizer> =
    LazyLock::new(|| SentenceSummarizer::new(Lexicon::base_segmenter()));

/// Query-side parameters of the summary extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryRequest {
    /// Source field; dotted paths address nested objects.
    pub field: String,
    /// Maximum summary length in characters.
    pub size: usize,
}

impl Default for SummaryRequest {
    fn default() -> Self {
        SummaryRequest {
            field: "content".to_string(),
            size: 100,
        }
    }
}

impl SummaryRequest {
    /// Parse a request from its JSON form, e.g. `{"field": "body", "size": 80}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Name of the derived field.
    pub fn output_field(&self) -> String {
        format!("summary-{}", self.field)
    }
}

/// Result of the summary extension for one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    /// A derived field to attach to the hit.
    Field {
        /// Field name, `summary-{field}`.
        name: String,
        /// Summary text.
        value: String,
    },
    /// Nothing to add for this document.
    Skip,
}

/// Summarize `document` with the bundled dictionary.
pub fn summarize(document: &Value, request: &SummaryRequest) -> SummaryOutcome {
    DEFAULT_SUMMARIZER.summarize(document, request)
}

/// TextRank sentence summarizer.
#[derive(Clone)]
pub struct SentenceSummarizer {
    segmenter: Arc<Jieba>,
}

impl SentenceSummarizer {
    /// Create a summarizer splitting words with `segmenter`.
    pub fn new(segmenter: Arc<Jieba>) -> Self {
        SentenceSummarizer { segmenter }
    }

    /// Summarize `document` according to `request`.
    pub fn summarize(&self, document: &Value, request: &SummaryRequest) -> SummaryOutcome {
        match self.try_summarize(document, request) {
            Ok(Some(value)) => SummaryOutcome::Field {
                name: request.output_field(),
                value,
            },
            Ok(None) => SummaryOutcome::Skip,
            Err(err) => {
                debug!("skipping summary: {err}");
                SummaryOutcome::Skip
            }
        }
    }

    fn try_summarize(&self, document: &Value, request: &SummaryRequest) -> Result<Option<String>> {
        if request.size == 0 {
            return Err(HanlexError::summary("size must be greater than 0"));
        }
        let Some(value) = lookup(document, &request.field) else {
            return Ok(None);
        };
        let text = value.as_str().ok_or_else(|| {
            HanlexError::summary(format!("field '{}' is not text", request.field))
        })?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.summary(text, request.size)))
    }

    /// The most central sentences of `text`, in document order, within
    /// `max_chars` characters. The top sentence is truncated if it alone
    /// exceeds the budget.
    pub fn summary(&self, text: &str, max_chars: usize) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return String::new();
        }

        let scores = self.rank(&sentences);
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        let mut chosen = Vec::new();
        let mut used = 0;
        for idx in order {
            let len = sentences[idx].chars().count();
            if used + len <= max_chars {
                chosen.push(idx);
                used += len;
            }
        }
        if chosen.is_empty() {
            let best = scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
                .map_or(0, |(idx, _)| idx);
            return sentences[best].chars().take(max_chars).collect();
        }
        chosen.sort_unstable();
        chosen.iter().map(|&idx| sentences[idx]).collect()
    }

    fn words(&self, sentence: &str) -> HashSet<String> {
        self.segmenter
            .cut(sentence, false)
            .into_iter()
            .map(str::trim)
            .filter(|w| !w.is_empty() && !is_punctuation(w))
            .filter(|w| !DEFAULT_CHINESE_STOP_WORDS_SET.contains(*w))
            .map(str::to_lowercase)
            .collect()
    }

    fn rank(&self, sentences: &[&str]) -> Vec<f64> {
        let n = sentences.len();
        let words: Vec<HashSet<String>> = sentences.iter().map(|s| self.words(s)).collect();

        let mut weights = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let common = words[i].intersection(&words[j]).count();
                if common == 0 {
                    continue;
                }
                let norm = ((words[i].len() + 1) as f64).ln() + ((words[j].len() + 1) as f64).ln();
                let weight = common as f64 / norm;
                weights[i][j] = weight;
                weights[j][i] = weight;
            }
        }
        let out_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

        let mut scores = vec![1.0; n];
        for _ in 0..MAX_ITERATIONS {
            let next: Vec<f64> = (0..n)
                .map(|i| {
                    let incoming: f64 = (0..n)
                        .filter(|&j| out_sums[j] > 0.0)
                        .map(|j| weights[j][i] / out_sums[j] * scores[j])
                        .sum();
                    (1.0 - DAMPING) + DAMPING * incoming
                })
                .collect();
            let delta = next
                .iter()
                .zip(&scores)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            scores = next;
            if delta < TOLERANCE {
                break;
            }
        }
        scores
    }
}

impl std::fmt::Debug for SentenceSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceSummarizer").finish_non_exhaustive()
    }
}

/// Split text into trimmed, non-empty sentences.
fn split_sentences(text: &str) -> Vec<&str> {
    text.split_sentence_bounds()
        .flat_map(|s| s.split(['；', ';']))
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_punctuation(s))
        .collect()
}

/// Resolve `path` in `document`: a literal key first, then dotted segments.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let object = document.as_object()?;
    if let Some(value) = object.get(path) {
        return Some(value);
    }
    path.split('.')
        .try_fold(document, |value, segment| value.as_object()?.get(segment))
}
