//! Dataset-level statistics: totals, normal/abnormal split, term frequency
//! tables and average lengths.

use crate::{
    error::ReportError,
    sample::{validate_records, Record, Sample},
    terms::{detect_topics, extract_terms},
    text_metrics::word_count,
};
use log::info;
use serde::Serialize;

/// Target phrases that mark a report as normal.
///
/// Heuristic only. "No evidence of infection" is classed abnormal (no
/// "no acute"), while "abnormal" contains "normal" and is classed normal.
pub const NORMAL_MARKERS: &[&str] = &["no acute", "normal", "negative"];

pub const TOP_CONDITIONS: usize = 10;
pub const TOP_ANATOMY: usize = 10;
pub const TOP_STATUS: usize = 5;
pub const TOP_TOPICS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Finding {
    Normal,
    Abnormal,
}

pub fn classify_target(target_text: &str) -> Finding {
    let lower = target_text.to_lowercase();
    if NORMAL_MARKERS.iter().any(|m| lower.contains(m)) {
        Finding::Normal
    } else {
        Finding::Abnormal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Occurrence counts that remember the order terms were first seen in.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<TermCount>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: &str) {
        match self.entries.iter_mut().find(|e| e.term == term) {
            Some(e) => e.count += 1,
            None => self.entries.push(TermCount {
                term: term.to_owned(),
                count: 1,
            }),
        }
    }

    pub fn extend<'a>(&mut self, terms: impl IntoIterator<Item = &'a str>) {
        for t in terms {
            self.add(t);
        }
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<TermCount> {
        let mut sorted = self.entries.clone();
        // stable
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }
}

/// `count / total` as a percentage; `None` for an empty collection.
pub fn share(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64 * 100.0)
}

/// Everything the dashboards print about one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub normal: usize,
    pub abnormal: usize,
    pub total_input_words: usize,
    pub total_target_words: usize,
    /// `None` when there are no samples.
    pub avg_input_words: Option<f64>,
    pub avg_target_words: Option<f64>,
    /// Ratio of the two averages; `None` without samples or target words.
    pub compression_ratio: Option<f64>,
    pub conditions: Vec<TermCount>,
    pub anatomy: Vec<TermCount>,
    pub status: Vec<TermCount>,
    pub topics: Vec<TermCount>,
}

impl ReportSummary {
    pub fn normal_share(&self) -> Option<f64> {
        share(self.normal, self.total)
    }

    pub fn abnormal_share(&self) -> Option<f64> {
        share(self.abnormal, self.total)
    }
}

/// Running totals while walking a collection.
#[derive(Debug, Default)]
struct ReportAgg {
    total: usize,
    normal: usize,
    input_words: usize,
    target_words: usize,
    conditions: FrequencyTable,
    anatomy: FrequencyTable,
    status: FrequencyTable,
    topics: FrequencyTable,
}

impl ReportAgg {
    fn update(&mut self, sample: &Sample) {
        self.total += 1;
        self.input_words += word_count(&sample.input_text);
        self.target_words += word_count(&sample.target_text);

        if classify_target(&sample.target_text) == Finding::Normal {
            self.normal += 1;
        }

        let found = extract_terms(&format!("{} {}", sample.input_text, sample.target_text));
        self.conditions.extend(found.conditions);
        self.anatomy.extend(found.anatomy);
        self.status.extend(found.status);
        self.topics.extend(detect_topics(&sample.input_text));
    }

    fn finish(self) -> ReportSummary {
        let avg = |words: usize| (self.total > 0).then(|| words as f64 / self.total as f64);
        let compression_ratio = (self.total > 0 && self.target_words > 0)
            .then(|| self.input_words as f64 / self.target_words as f64);

        ReportSummary {
            total: self.total,
            normal: self.normal,
            abnormal: self.total - self.normal,
            total_input_words: self.input_words,
            total_target_words: self.target_words,
            avg_input_words: avg(self.input_words),
            avg_target_words: avg(self.target_words),
            compression_ratio,
            conditions: self.conditions.top(TOP_CONDITIONS),
            anatomy: self.anatomy.top(TOP_ANATOMY),
            status: self.status.top(TOP_STATUS),
            topics: self.topics.top(TOP_TOPICS),
        }
    }
}

/// Summarise already validated samples.
pub fn summarize(samples: &[Sample]) -> ReportSummary {
    let mut agg = ReportAgg::default();
    for s in samples {
        agg.update(s);
    }
    let summary = agg.finish();
    info!(
        "Report built: {} samples, {} normal, {} abnormal",
        summary.total, summary.normal, summary.abnormal
    );
    summary
}

/// Validate every record, then summarise. One bad record fails the report
/// so averages are never computed over silently defaulted text.
pub fn build_report(records: &[Record]) -> Result<ReportSummary, ReportError> {
    let samples = validate_records(records)?;
    Ok(summarize(&samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(input: &str, target: &str) -> Record {
        Record {
            inputs: Some(input.to_owned()),
            target: Some(target.to_owned()),
            ..Record::default()
        }
    }

    #[test]
    fn classification_examples() {
        assert_eq!(
            classify_target("No acute cardiopulmonary abnormality"),
            Finding::Normal
        );
        assert_eq!(
            classify_target("Right upper lobe mass suspicious for malignancy"),
            Finding::Abnormal
        );
        assert_eq!(classify_target("Negative for fracture."), Finding::Normal);
    }

    #[test]
    fn classification_known_limits() {
        assert_eq!(classify_target("No evidence of infection"), Finding::Abnormal);
        assert_eq!(classify_target("Abnormal opacity"), Finding::Normal);
    }

    #[test]
    fn totals_match_collection_size() {
        for n in [0usize, 1, 7] {
            let records: Vec<Record> = (0..n).map(|_| rec("a b c", "a")).collect();
            let summary = build_report(&records).unwrap();
            assert_eq!(summary.total, n);
            assert_eq!(summary.normal + summary.abnormal, n);
        }
    }

    #[test]
    fn empty_collection_is_nan_safe() {
        let summary = build_report(&[]).unwrap();
        assert_eq!(summary.avg_input_words, None);
        assert_eq!(summary.avg_target_words, None);
        assert_eq!(summary.compression_ratio, None);
        assert_eq!(summary.normal_share(), None);
        assert!(summary.conditions.is_empty());
    }

    #[test]
    fn empty_targets_leave_ratio_undefined() {
        let summary = build_report(&[rec("one two", "")]).unwrap();
        assert_eq!(summary.avg_target_words, Some(0.0));
        assert_eq!(summary.compression_ratio, None);
    }

    #[test]
    fn averages_and_ratio() {
        let records = vec![
            rec("one two three four", "one two"),
            rec("one two three four five six", "one two"),
        ];
        let summary = build_report(&records).unwrap();
        assert_eq!(summary.avg_input_words, Some(5.0));
        assert_eq!(summary.avg_target_words, Some(2.0));
        assert_eq!(summary.compression_ratio, Some(2.5));
    }

    #[test]
    fn bad_record_fails_whole_report() {
        let mut records = vec![rec("a", "b"), rec("c", "d")];
        records.push(Record {
            inputs: Some("e".into()),
            ..Record::default()
        });
        let err = build_report(&records).unwrap_err();
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn frequency_top_is_stable_and_truncated() {
        let mut table = FrequencyTable::new();
        for t in ["c", "a", "b", "a", "d", "e", "f", "g", "b"] {
            table.add(t);
        }
        let top = table.top(5);
        assert_eq!(top.len(), 5);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b", "c", "d", "e"]);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn terms_counted_once_per_sample() {
        let records = vec![
            rec("left effusion, left edema", "effusion"),
            rec("right effusion", "No acute disease"),
        ];
        let summary = build_report(&records).unwrap();
        assert_eq!(summary.conditions[0].term, "effusion");
        assert_eq!(summary.conditions[0].count, 2);
        assert_eq!(summary.normal, 1);
        assert_eq!(summary.abnormal, 1);
    }

    #[test]
    fn topics_come_from_input_only() {
        let records = vec![
            rec("Is this pill safe with my therapy?", "pill safety"),
            rec("Where can I get a test?", "pain test"),
        ];
        let summary = build_report(&records).unwrap();
        let topics: Vec<(&str, usize)> = summary
            .topics
            .iter()
            .map(|t| (t.term.as_str(), t.count))
            .collect();
        assert_eq!(
            topics,
            vec![("Medication", 1), ("Treatment", 1), ("Diagnosis", 1)]
        );
    }

    #[test]
    fn share_guards_zero_total() {
        assert_eq!(share(1, 0), None);
        assert_eq!(share(1, 4), Some(25.0));
    }
}
