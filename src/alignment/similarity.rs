/*!
 * Textual similarity primitives for the aligner.
 *
 * Provides the two normalized scores the fallback pass is built on:
 * token-set Jaccard similarity and a normalized Levenshtein
 * edit-distance ratio, both computed over text that has been
 * lower-cased and stripped of punctuation. A [`TextCache`] memoizes
 * normalization and token sets across the many comparisons one
 * alignment run performs.
 */

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static FOOTNOTE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+[a-z]?\b").unwrap());
static PUNCTUATION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize text for similarity comparison: lowercase, drop footnote
/// markers and stray verse numbers, turn punctuation into spaces,
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mut normalized = text.to_lowercase();
    normalized = FOOTNOTE_PATTERN.replace_all(&normalized, "").into_owned();
    normalized = NUMBER_PATTERN.replace_all(&normalized, "").into_owned();
    normalized = PUNCTUATION_PATTERN.replace_all(&normalized, " ").into_owned();
    normalized = WHITESPACE_PATTERN.replace_all(&normalized, " ").into_owned();
    normalized.trim().to_string()
}

/// The word set of a normalized text.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Intersection-over-union of two word sets.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Levenshtein distance with the two-row optimization.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Edit distance divided by the longer string's length; 0.0 for two
/// empty strings.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    let longer = a.chars().count().max(b.chars().count());
    if longer == 0 {
        return 0.0;
    }
    levenshtein_distance(a, b) as f64 / longer as f64
}

/// Both scores of one candidate comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    pub jaccard: f64,
    pub edit_ratio: f64,
}

/// Memoized normalization and token sets, keyed by the raw text.
///
/// One alignment run compares the same reference verse against many
/// candidates; caching keeps the regex work linear in distinct texts.
#[derive(Debug, Default)]
pub struct TextCache {
    normalized: HashMap<String, String>,
    tokens: HashMap<String, HashSet<String>>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalized(&mut self, text: &str) -> String {
        if let Some(cached) = self.normalized.get(text) {
            return cached.clone();
        }
        let normalized = normalize(text);
        self.normalized.insert(text.to_string(), normalized.clone());
        normalized
    }

    pub fn tokens(&mut self, text: &str) -> HashSet<String> {
        if let Some(cached) = self.tokens.get(text) {
            return cached.clone();
        }
        let tokens = token_set(text);
        self.tokens.insert(text.to_string(), tokens.clone());
        tokens
    }

    /// Score a candidate text against a source text.
    pub fn score(&mut self, source: &str, candidate: &str) -> SimilarityScore {
        let source_tokens = self.tokens(source);
        let candidate_tokens = self.tokens(candidate);
        let source_norm = self.normalized(source);
        let candidate_norm = self.normalized(candidate);

        SimilarityScore {
            jaccard: jaccard(&source_tokens, &candidate_tokens),
            edit_ratio: edit_ratio(&source_norm, &candidate_norm),
        }
    }

    pub fn clear(&mut self) {
        self.normalized.clear();
        self.tokens.clear();
    }
}
