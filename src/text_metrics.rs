//! Per-pair word counts, compression ratio and key-term preservation.

use serde::Serialize;

/// Trailing characters dropped from a target token before matching.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':'];

/// Tokens this short are never counted as key terms.
const MIN_TERM_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairMetrics {
    pub input_word_count: usize,
    pub target_word_count: usize,
    /// `input / max(target, 1)`; a length ratio, not real compression.
    pub compression_ratio: f64,
    pub preserved_term_count: usize,
    /// Target tokens (as written) that counted towards `preserved_term_count`.
    pub preserved_terms: Vec<String>,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Compare an input text with its summary.
///
/// A target token is "preserved" when, lowercased and stripped of trailing
/// `.,;:`, it is longer than three characters and occurs anywhere in the
/// lowercased input. The test is a plain substring search, so "lobe" also
/// matches inside "lobes" or "globe"; counts run high on purpose.
pub fn compute_pair_metrics(input_text: &str, target_text: &str) -> PairMetrics {
    let input_word_count = word_count(input_text);
    let target_word_count = word_count(target_text);
    let input_lower = input_text.to_lowercase();

    let preserved_terms: Vec<String> = target_text
        .split_whitespace()
        .filter(|word| {
            let clean = word.trim_end_matches(TRAILING_PUNCT).to_lowercase();
            clean.chars().count() >= MIN_TERM_CHARS && input_lower.contains(&clean)
        })
        .map(str::to_owned)
        .collect();

    PairMetrics {
        input_word_count,
        target_word_count,
        compression_ratio: input_word_count as f64 / target_word_count.max(1) as f64,
        preserved_term_count: preserved_terms.len(),
        preserved_terms,
    }
}
