//! Inspection and reporting helpers for a clinical text summarization
//! dataset (radiology findings, health questions, doctor-patient dialogues).
//!
//! The binaries in `src/*.rs` are thin: load a JSON-Lines file with
//! [`sample::load_records`], compute with [`report`], [`text_metrics`] or
//! [`scorers`], and print through a [`render::Renderer`].

pub mod datasets;
pub mod error;
pub mod logging;
pub mod render;
pub mod report;
pub mod sample;
pub mod scorers;
pub mod terms;
pub mod text_metrics;

pub use error::{LoadError, ReportError, ScoreError};
pub use report::{build_report, classify_target, Finding, FrequencyTable, ReportSummary};
pub use sample::{load_records, Record, Sample};
pub use terms::{detect_topics, extract_terms, ExtractedTerms};
pub use text_metrics::{compute_pair_metrics, PairMetrics};
