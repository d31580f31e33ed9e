//! Fixed clinical vocabularies and the keyword matchers built on them.
//!
//! Matching is a case-insensitive substring test against the whole text:
//! no tokenization and no stemming. Short entries therefore also hit inside
//! longer words ("thorax" in "pneumothorax", "normal" in "abnormal").

use serde::Serialize;

pub const CONDITIONS: &[&str] = &[
    "pneumonia",
    "edema",
    "effusion",
    "consolidation",
    "atelectasis",
    "cardiomegaly",
    "pneumothorax",
    "nodule",
    "mass",
    "fracture",
    "infiltrate",
    "opacity",
    "calcification",
    "granuloma",
    "emphysema",
    "hypertension",
    "diabetes",
    "asthma",
    "copd",
    "cancer",
];

pub const ANATOMY: &[&str] = &[
    "heart",
    "lung",
    "chest",
    "cardiac",
    "pulmonary",
    "mediastinal",
    "pleural",
    "thorax",
    "right",
    "left",
    "upper",
    "lower",
    "lobe",
];

pub const STATUS: &[&str] = &[
    "normal",
    "abnormal",
    "acute",
    "chronic",
    "stable",
    "improved",
    "worsened",
    "negative",
    "positive",
    "clear",
    "unremarkable",
];

/// A question topic and the keywords that tag it.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

pub const TOPICS: &[TopicRule] = &[
    TopicRule {
        label: "Medication",
        keywords: &["medication", "drug", "pill", "prescription"],
    },
    TopicRule {
        label: "Pain",
        keywords: &["pain", "hurt", "ache"],
    },
    TopicRule {
        label: "Treatment",
        keywords: &["treatment", "therapy", "cure"],
    },
    TopicRule {
        label: "Side Effects",
        keywords: &["side effect", "adverse", "reaction"],
    },
    TopicRule {
        label: "Diagnosis",
        keywords: &["test", "diagnosis", "screen"],
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedTerms {
    pub conditions: Vec<&'static str>,
    pub anatomy: Vec<&'static str>,
    pub status: Vec<&'static str>,
}

impl ExtractedTerms {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.anatomy.is_empty() && self.status.is_empty()
    }
}

fn matches_in(vocab: &'static [&'static str], text_lower: &str) -> Vec<&'static str> {
    vocab
        .iter()
        .copied()
        .filter(|term| text_lower.contains(term))
        .collect()
}

/// Vocabulary entries found in `text`, each list in declaration order.
pub fn extract_terms(text: &str) -> ExtractedTerms {
    let lower = text.to_lowercase();
    ExtractedTerms {
        conditions: matches_in(CONDITIONS, &lower),
        anatomy: matches_in(ANATOMY, &lower),
        status: matches_in(STATUS, &lower),
    }
}

/// Topic labels with at least one keyword in `text`, in table order.
pub fn detect_topics(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_declaration_order() {
        let found = extract_terms("Right lower lobe consolidation, no pneumothorax");
        assert_eq!(found.conditions, vec!["consolidation", "pneumothorax"]);
        // "thorax" rides along inside "pneumothorax"
        assert_eq!(found.anatomy, vec!["thorax", "right", "lower", "lobe"]);
        assert!(found.status.is_empty());
    }

    #[test]
    fn detection_ignores_case() {
        let found = extract_terms("CARDIOMEGALY with Pleural EFFUSION");
        assert_eq!(found.conditions, vec!["effusion", "cardiomegaly"]);
        assert_eq!(found.anatomy, vec!["pleural"]);
    }

    #[test]
    fn abnormal_also_reports_normal() {
        let found = extract_terms("Abnormal study");
        assert_eq!(found.status, vec!["normal", "abnormal"]);
    }

    #[test]
    fn nothing_found_is_empty() {
        assert!(extract_terms("patient tolerated procedure").is_empty());
        assert!(extract_terms("").is_empty());
    }

    #[test]
    fn a_question_can_carry_several_topics() {
        let topics = detect_topics("Does this Drug cause an adverse reaction or pain?");
        assert_eq!(topics, vec!["Medication", "Pain", "Side Effects"]);
    }

    #[test]
    fn multi_word_keyword_needs_contiguous_text() {
        assert!(detect_topics("any side effects?").contains(&"Side Effects"));
        assert!(detect_topics("my left side has an effect").is_empty());
    }
}
