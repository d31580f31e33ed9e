//! Reference-based text similarity metrics.
//!
//! Each [`Scorer`] takes parallel prediction/reference lists and returns one
//! or more named scores. [`run_scorers`] runs them one after another and
//! keeps going when one fails.

mod bertscore;
mod bleu;
mod rouge;

pub use bertscore::BertScorer;
pub use bleu::{corpus_bleu, BleuScorer};
pub use rouge::{rouge_l, rouge_n, RougeScore, RougeScorer};

use crate::error::ScoreError;
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub name: String,
    pub value: f64,
}

impl MetricScore {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

pub trait Scorer {
    /// Name used in progress output and in the list of absent metrics.
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> Result<Vec<MetricScore>, ScoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFailure {
    pub metric: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub samples: usize,
    pub scores: Vec<MetricScore>,
    pub failures: Vec<MetricFailure>,
}

impl MetricsSummary {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn absent(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.metric.as_str())
    }

    pub fn record(&mut self, scorer: &str, outcome: Result<Vec<MetricScore>, ScoreError>) {
        match outcome {
            Ok(scores) => {
                for s in &scores {
                    info!("{scorer}: {} = {:.4}", s.name, s.value);
                }
                self.scores.extend(scores);
            }
            Err(e) => {
                warn!("{scorer} failed: {e}");
                self.failures.push(MetricFailure {
                    metric: scorer.to_owned(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Shared input check for every scorer.
pub fn check_pairs(predictions: &[String], references: &[String]) -> Result<(), ScoreError> {
    if predictions.len() != references.len() {
        return Err(ScoreError::LengthMismatch {
            predictions: predictions.len(),
            references: references.len(),
        });
    }
    if predictions.is_empty() {
        return Err(ScoreError::Empty);
    }
    Ok(())
}

/// Run every scorer; a failing one is recorded and the rest still run.
pub fn run_scorers(
    scorers: &[Box<dyn Scorer>],
    predictions: &[String],
    references: &[String],
) -> MetricsSummary {
    run_scorers_with(scorers, predictions, references, |_| {})
}

/// Same as [`run_scorers`], calling `on_start` with each scorer's name
/// before it runs (progress display).
pub fn run_scorers_with(
    scorers: &[Box<dyn Scorer>],
    predictions: &[String],
    references: &[String],
    mut on_start: impl FnMut(&str),
) -> MetricsSummary {
    let mut summary = MetricsSummary {
        samples: predictions.len(),
        ..MetricsSummary::default()
    };
    for scorer in scorers {
        on_start(scorer.name());
        summary.record(scorer.name(), scorer.compute(predictions, references));
    }
    summary
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub(crate) fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}
