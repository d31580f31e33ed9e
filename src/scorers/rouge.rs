use super::{check_pairs, f_measure, MetricScore, Scorer};
use crate::error::ScoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Tokens of this many characters or fewer are left unstemmed.
const MIN_STEM_CHARS: usize = 3;

/// Lowercase, treat every run of non-alphanumerics as a separator, then stem
/// tokens longer than three characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    NON_ALNUM
        .split(&lower)
        .filter(|t| !t.is_empty())
        .map(|t| {
            if t.len() > MIN_STEM_CHARS {
                STEMMER.stem(t).into_owned()
            } else {
                t.to_owned()
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl RougeScore {
    fn from_overlap(overlap: usize, pred_total: usize, ref_total: usize) -> Self {
        let precision = overlap as f64 / pred_total.max(1) as f64;
        let recall = overlap as f64 / ref_total.max(1) as f64;
        Self {
            precision,
            recall,
            fmeasure: f_measure(precision, recall),
        }
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_default() += 1;
    }
    counts
}

/// ROUGE-N between one reference and one prediction. `n == 0` scores zero.
pub fn rouge_n(reference: &str, prediction: &str, n: usize) -> RougeScore {
    if n == 0 {
        return RougeScore::from_overlap(0, 0, 0);
    }
    let ref_tokens = tokenize(reference);
    let pred_tokens = tokenize(prediction);
    let ref_counts = ngram_counts(&ref_tokens, n);
    let pred_counts = ngram_counts(&pred_tokens, n);

    let overlap = ref_counts
        .iter()
        .map(|(gram, &rc)| rc.min(pred_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    RougeScore::from_overlap(
        overlap,
        pred_counts.values().sum(),
        ref_counts.values().sum(),
    )
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// ROUGE-L (longest common subsequence) between one reference and one prediction.
pub fn rouge_l(reference: &str, prediction: &str) -> RougeScore {
    let ref_tokens = tokenize(reference);
    let pred_tokens = tokenize(prediction);
    let lcs = lcs_length(&ref_tokens, &pred_tokens);
    RougeScore::from_overlap(lcs, pred_tokens.len(), ref_tokens.len())
}

/// ROUGE-1, ROUGE-2 and ROUGE-L F-measures, averaged over pairs.
#[derive(Debug, Default)]
pub struct RougeScorer;

impl Scorer for RougeScorer {
    fn name(&self) -> &'static str {
        "ROUGE"
    }

    fn compute(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> Result<Vec<MetricScore>, ScoreError> {
        check_pairs(predictions, references)?;

        let mut sums = [0.0f64; 3];
        for (pred, reference) in predictions.iter().zip(references) {
            sums[0] += rouge_n(reference, pred, 1).fmeasure;
            sums[1] += rouge_n(reference, pred, 2).fmeasure;
            sums[2] += rouge_l(reference, pred).fmeasure;
        }
        let n = predictions.len() as f64;
        Ok(vec![
            MetricScore::new("ROUGE-1", sums[0] / n),
            MetricScore::new("ROUGE-2", sums[1] / n),
            MetricScore::new("ROUGE-L", sums[2] / n),
        ])
    }
}
