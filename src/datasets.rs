//! The datasets the tools know about, and where their files live.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

/// Shapes of dataset; decides labels, truncation and report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Radiology,
    HealthQuestions,
    Dialogue,
}

impl DatasetKind {
    pub fn input_label(self) -> &'static str {
        match self {
            Self::Radiology => "RADIOLOGY FINDINGS (Input)",
            Self::HealthQuestions => "PATIENT QUESTION (Input)",
            Self::Dialogue => "DOCTOR-PATIENT DIALOGUE (Input)",
        }
    }

    pub fn summary_label(self) -> &'static str {
        match self {
            Self::Radiology => "IMPRESSION (Summary)",
            Self::HealthQuestions => "SUMMARIZED QUESTION",
            Self::Dialogue => "ASSESSMENT & PLAN (Summary)",
        }
    }

    /// Display limits in characters for (input, summary); `None` = full text.
    pub fn display_limits(self) -> (Option<usize>, Option<usize>) {
        match self {
            Self::Radiology => (Some(400), None),
            Self::HealthQuestions => (None, None),
            Self::Dialogue => (Some(400), Some(300)),
        }
    }

    /// Noun used in overview tables ("Total Reports", ...).
    pub fn unit(self) -> &'static str {
        match self {
            Self::Radiology => "Reports",
            Self::HealthQuestions => "Questions",
            Self::Dialogue => "Dialogues",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub key: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub kind: DatasetKind,
}

pub const DATASETS: &[Dataset] = &[
    Dataset {
        key: "1",
        code: "opi",
        name: "Open-i Radiology Reports",
        kind: DatasetKind::Radiology,
    },
    Dataset {
        key: "2",
        code: "chq",
        name: "Consumer Health Questions",
        kind: DatasetKind::HealthQuestions,
    },
    Dataset {
        key: "3",
        code: "d2n",
        name: "Doctor-Patient Dialogues",
        kind: DatasetKind::Dialogue,
    },
];

pub const TEST_FILE: &str = "test.jsonl";
pub const RESULT_FILE: &str = "result.jsonl";

pub fn by_key(key: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|d| d.key == key.trim())
}

pub fn by_code(code: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|d| d.code == code)
}

impl Dataset {
    pub fn test_file(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.code).join(TEST_FILE)
    }

    pub fn result_file(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.code).join(RESULT_FILE)
    }
}

/// Guess the dataset a file belongs to from its parent directory name.
pub fn infer_from_path(path: &Path) -> Option<&'static Dataset> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .and_then(by_code)
}

/// Result files that exist under `data_dir`, in menu order.
pub fn available_result_files(data_dir: &Path) -> Vec<PathBuf> {
    DATASETS
        .iter()
        .map(|d| d.result_file(data_dir))
        .filter(|p| p.exists())
        .collect()
}

/// Print the menu to `out` and read one choice from `input`.
/// `Ok(None)` means the answer matched no dataset.
pub fn prompt_choice(
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<Option<&'static Dataset>> {
    writeln!(out, "\nAvailable datasets:")?;
    for d in DATASETS {
        writeln!(out, "  {}. {} ({})", d.key, d.name, d.code)?;
    }
    write!(out, "\nChoose a dataset (1-{}): ", DATASETS.len())?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(by_key(&line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lookup_by_key_and_code() {
        assert_eq!(by_key("2").map(|d| d.code), Some("chq"));
        assert_eq!(by_key(" 3\n").map(|d| d.code), Some("d2n"));
        assert!(by_key("9").is_none());
        assert_eq!(by_code("opi").map(|d| d.kind), Some(DatasetKind::Radiology));
    }

    #[test]
    fn file_layout() {
        let d = by_code("opi").unwrap();
        assert_eq!(
            d.test_file(Path::new("data")),
            Path::new("data").join("opi").join("test.jsonl")
        );
        assert_eq!(
            infer_from_path(&d.result_file(Path::new("/x/data"))).map(|d| d.code),
            Some("opi")
        );
        assert!(infer_from_path(Path::new("results.jsonl")).is_none());
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut input = Cursor::new("1\n");
        let mut out = Vec::new();
        let picked = prompt_choice(&mut input, &mut out).unwrap();
        assert_eq!(picked.map(|d| d.code), Some("opi"));
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("2. Consumer Health Questions (chq)"));

        let mut input = Cursor::new("x\n");
        assert!(prompt_choice(&mut input, &mut Vec::new()).unwrap().is_none());
    }
}
