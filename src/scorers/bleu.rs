use super::{check_pairs, MetricScore, Scorer};
use crate::error::ScoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const MAX_ORDER: usize = 4;

// mteval-v13a style punctuation splitting
static PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\{-~\[-` -&\(-\+:-@/])").unwrap());
static PERIOD_COMMA_UNLESS_PRECEDED_BY_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^0-9])([\.,])").unwrap());
static PERIOD_COMMA_UNLESS_FOLLOWED_BY_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\.,])([^0-9])").unwrap());
static DASH_AFTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])(-)").unwrap());

/// Case-preserving tokenizer: punctuation becomes its own token, except
/// `.`/`,` inside numbers. The four common HTML entities are unescaped first.
pub(crate) fn tokenize_13a(text: &str) -> Vec<String> {
    let mut s = text.replace("<skipped>", "").replace("-\n", "").replace('\n', " ");
    if s.contains('&') {
        s = s
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }
    // padded so a final `.` after a digit still splits
    let s = format!(" {s} ");
    let s = PUNCT.replace_all(&s, " $1 ");
    let s = PERIOD_COMMA_UNLESS_PRECEDED_BY_DIGIT.replace_all(&s, "$1 $2 ");
    let s = PERIOD_COMMA_UNLESS_FOLLOWED_BY_DIGIT.replace_all(&s, " $1 $2");
    let s = DASH_AFTER_DIGIT.replace_all(&s, "$1 $2 ");
    s.split_whitespace().map(str::to_owned).collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_default() += 1;
    }
    counts
}

/// Corpus-level BLEU-4 with brevity penalty and no smoothing, one reference
/// per prediction. Any order with zero matches gives 0.
pub fn corpus_bleu(predictions: &[String], references: &[String]) -> f64 {
    let mut matches = [0usize; MAX_ORDER];
    let mut possible = [0usize; MAX_ORDER];
    let (mut pred_len, mut ref_len) = (0usize, 0usize);

    for (pred, reference) in predictions.iter().zip(references) {
        let pred_tokens = tokenize_13a(pred);
        let ref_tokens = tokenize_13a(reference);
        pred_len += pred_tokens.len();
        ref_len += ref_tokens.len();

        for order in 1..=MAX_ORDER {
            let pred_counts = ngram_counts(&pred_tokens, order);
            let ref_counts = ngram_counts(&ref_tokens, order);
            matches[order - 1] += pred_counts
                .iter()
                .map(|(gram, &c)| c.min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum::<usize>();
            possible[order - 1] += pred_tokens.len().saturating_sub(order - 1);
        }
    }

    if matches.iter().any(|&m| m == 0) {
        return 0.0;
    }
    let log_mean = matches
        .iter()
        .zip(&possible)
        .map(|(&m, &p)| (m as f64 / p as f64).ln())
        .sum::<f64>()
        / MAX_ORDER as f64;

    let ratio = pred_len as f64 / ref_len.max(1) as f64;
    let brevity_penalty = if ratio > 1.0 { 1.0 } else { (1.0 - 1.0 / ratio).exp() };
    log_mean.exp() * brevity_penalty
}

#[derive(Debug, Default)]
pub struct BleuScorer;

impl Scorer for BleuScorer {
    fn name(&self) -> &'static str {
        "BLEU"
    }

    fn compute(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> Result<Vec<MetricScore>, ScoreError> {
        check_pairs(predictions, references)?;
        Ok(vec![MetricScore::new("BLEU", corpus_bleu(predictions, references))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenizer_splits_punctuation_not_decimals() {
        assert_eq!(
            tokenize_13a("Heart size 1.5 cm, stable."),
            vec!["Heart", "size", "1.5", "cm", ",", "stable", "."]
        );
    }

    #[test]
    fn tokenizer_unescapes_html_entities() {
        assert_eq!(
            tokenize_13a("Nodule &lt;5 mm &quot;stable&quot;"),
            vec!["Nodule", "<", "5", "mm", "\"", "stable", "\""]
        );
        assert_eq!(tokenize_13a("effusion &amp; edema"), vec!["effusion", "&", "edema"]);
    }

    #[test]
    fn tokenizer_splits_final_period_after_digit() {
        assert_eq!(tokenize_13a("Size 5."), vec!["Size", "5", "."]);
    }

    #[test]
    fn partial_overlap_matches_reference_value() {
        // precisions 8/9, 3/4, 4/7, 1/3; equal lengths so no brevity penalty
        let preds = strings(&[
            "The patient has a small left pleural effusion.",
            "No acute cardiopulmonary process &amp; stable heart size.",
        ]);
        let refs = strings(&[
            "The patient has a small right pleural effusion.",
            "No acute cardiopulmonary abnormality &amp; stable heart size.",
        ]);
        assert!((corpus_bleu(&preds, &refs) - 0.596_949_179_201_964_6).abs() < 1e-12);
    }

    #[test]
    fn identical_text_scores_one() {
        let s = strings(&["no acute cardiopulmonary process is seen today"]);
        assert!((corpus_bleu(&s, &s) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn short_sentences_without_four_gram_match_score_zero() {
        let bleu = corpus_bleu(&strings(&["the cat sat"]), &strings(&["a cat sat"]));
        assert_eq!(bleu, 0.0);
    }

    #[test]
    fn brevity_penalty_applies() {
        let preds = strings(&["one two three four five"]);
        let refs = strings(&["one two three four five six seven eight nine ten"]);
        let expected = (1.0f64 - 2.0).exp();
        assert!((corpus_bleu(&preds, &refs) - expected).abs() < 1e-12);
    }

    #[test]
    fn scorer_rejects_empty_input() {
        assert!(matches!(
            BleuScorer.compute(&[], &[]),
            Err(ScoreError::Empty)
        ));
    }
}
