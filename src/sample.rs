//! JSON-Lines records and validated samples.

use crate::error::{LoadError, ReportError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Placeholder shown for fields a record does not carry.
pub const MISSING: &str = "N/A";

/// One line of a dataset file, exactly as found on disk.
///
/// Source files disagree on `inputs` vs `input`, so both are kept and
/// [`Record::input_text`] picks whichever is present (`inputs` first).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Record {
    #[serde(default)]
    pub inputs: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl Record {
    pub fn input_text(&self) -> Option<&str> {
        self.inputs.as_deref().or(self.input.as_deref())
    }

    /// Display-only accessors; never feed these into aggregation.
    pub fn input_or_missing(&self) -> &str {
        self.input_text().unwrap_or(MISSING)
    }

    pub fn target_or_missing(&self) -> &str {
        self.target.as_deref().unwrap_or(MISSING)
    }

    pub fn output_or_missing(&self) -> &str {
        self.output.as_deref().unwrap_or(MISSING)
    }
}

/// A record with its required fields checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub input_text: String,
    pub target_text: String,
    pub output_text: Option<String>,
}

impl Sample {
    /// `index` only feeds the error message.
    pub fn from_record(index: usize, record: &Record) -> Result<Self, ReportError> {
        let input_text = record
            .input_text()
            .ok_or(ReportError::MissingField {
                index,
                field: "inputs",
            })?
            .to_owned();
        let target_text = record
            .target
            .clone()
            .ok_or(ReportError::MissingField {
                index,
                field: "target",
            })?;
        Ok(Self {
            input_text,
            target_text,
            output_text: record.output.clone(),
        })
    }
}

/// Validate a whole collection; the first bad record aborts with its index.
pub fn validate_records(records: &[Record]) -> Result<Vec<Sample>, ReportError> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Sample::from_record(i, r))
        .collect()
}

/// Read a JSON-Lines file. Blank lines are skipped; any other line that does
/// not parse aborts the load and names the line.
pub fn load_records(path: &Path) -> Result<Vec<Record>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            debug!("{}: skipping blank line {}", path.display(), idx + 1);
            continue;
        }
        let record: Record =
            serde_json::from_str(&line).map_err(|source| LoadError::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        records.push(record);
    }

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn inputs_wins_over_input() {
        let r = record(r#"{"inputs": "a", "input": "b", "target": "t"}"#);
        assert_eq!(r.input_text(), Some("a"));
        let r = record(r#"{"input": "b", "target": "t"}"#);
        assert_eq!(r.input_text(), Some("b"));
    }

    #[test]
    fn missing_target_names_the_record() {
        let records = vec![
            record(r#"{"inputs": "x", "target": "y"}"#),
            record(r#"{"inputs": "x"}"#),
        ];
        let err = validate_records(&records).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingField {
                index: 1,
                field: "target"
            }
        ));
        assert_eq!(err.to_string(), "record 1 is missing required field `target`");
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = Sample::from_record(4, &record(r#"{"target": "y"}"#)).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { index: 4, field: "inputs" }));
    }

    #[test]
    fn display_defaults_only_apply_to_display() {
        let r = record(r#"{"target": "y"}"#);
        assert_eq!(r.input_or_missing(), MISSING);
        assert_eq!(r.output_or_missing(), MISSING);
        assert_eq!(r.target_or_missing(), "y");
    }

    #[test]
    fn null_fields_count_as_missing() {
        let r = record(r#"{"inputs": null, "target": "y"}"#);
        assert!(Sample::from_record(0, &r).is_err());
    }
}
