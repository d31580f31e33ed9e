//! Error types shared by the loaders, the report builder and the scorers.

use std::path::PathBuf;
use thiserror::Error;

/// Reading a JSON-Lines file failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One line is not a JSON object. `line` is 1-based.
    #[error("malformed JSON on line {line} of {path}: {source}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A record could not be turned into a sample.
#[derive(Debug, Error)]
pub enum ReportError {
    /// `index` is the 0-based position of the record in the collection.
    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

/// A metric could not be computed.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{predictions} predictions but {references} references")]
    LengthMismatch {
        predictions: usize,
        references: usize,
    },

    #[error("no prediction/reference pairs to score")]
    Empty,

    /// Backend was not compiled in.
    #[error("{metric} unavailable: {reason}")]
    Unavailable {
        metric: &'static str,
        reason: String,
    },

    /// Backend ran and failed (model download, tensor op, ...).
    #[error("{metric} backend failed: {reason}")]
    Backend {
        metric: &'static str,
        reason: String,
    },
}

impl ScoreError {
    pub fn backend(metric: &'static str, reason: impl ToString) -> Self {
        Self::Backend {
            metric,
            reason: reason.to_string(),
        }
    }
}
