//! Presence checklist: deterministic ATS-style checks over the extracted text.
//!
//! The rule table is fixed configuration shared read-only by every run. Each
//! rule passes when any of its keywords occurs in the text (case-insensitive
//! substring) or, for rules that carry one, when its regex matches. Short
//! words that hide inside longer ones ("excel" in "excellent") live in the
//! regex with word boundaries instead of the keyword list.
//! Evaluation is pure: no I/O, no failure mode, output in table order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One presence rule.
#[derive(Debug)]
pub struct ChecklistRule {
    /// Stable identifier, used by tests and JSON consumers.
    pub id: &'static str,
    /// Human-readable description of what is checked.
    pub label: &'static str,
    /// Lower-case keyword variants; any one occurring is enough.
    pub keywords: &'static [&'static str],
    /// Optional regex, tried when no keyword matched.
    pub pattern: Option<&'static str>,
}

/// Outcome of one rule for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub id: String,
    pub label: String,
    pub present: bool,
}

/// The checklist, in display order.
pub const RULES: &[ChecklistRule] = &[
    ChecklistRule {
        id: "contact",
        label: "Contact information (email or phone)",
        keywords: &["email", "e-mail", "phone", "mobile", "tel:"],
        pattern: Some(
            // email | +international | (555) 010-2030 | 555-010-2030 | 5550102030
            r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}|\+\d[\d\s().-]{8,}\d|\(\d{3}\)\s*\d{3}[\s.-]?\d{4}|\b\d{3}[\s.-]\d{3}[\s.-]\d{4}\b|\b\d{10}\b",
        ),
    },
    ChecklistRule {
        id: "summary",
        label: "Professional summary or objective",
        keywords: &["summary", "objective", "profile", "about me"],
        pattern: None,
    },
    ChecklistRule {
        id: "experience",
        label: "Work experience section",
        keywords: &["experience", "employment", "work history", "internship"],
        pattern: None,
    },
    ChecklistRule {
        id: "education",
        label: "Education section",
        keywords: &[
            "education",
            "university",
            "college",
            "bachelor",
            "degree",
            "diploma",
            "b.tech",
        ],
        pattern: Some(r"(?i)\bmaster(?:'s|’s|s)?\s+(?:of|in|degree)\b|\bmaster(?:'s|’s|s)\b"),
    },
    ChecklistRule {
        id: "skills",
        label: "Skills section",
        keywords: &[
            "skills",
            "technologies",
            "tech stack",
            "proficient",
            "python",
            "java",
            "sql",
            "aws",
            "react",
        ],
        pattern: Some(r"(?i)\bexcel\b"),
    },
    ChecklistRule {
        id: "achievements",
        label: "Quantified achievements (numbers, percentages)",
        keywords: &[],
        pattern: Some(r"(?i)\d+(?:\.\d+)?\s*%|\$\s?\d|\b\d+(?:\.\d+)?\s*(?:percent|k|m|x)\b"),
    },
    ChecklistRule {
        id: "action_verbs",
        label: "Action verbs",
        keywords: &[],
        pattern: Some(
            r"(?i)\b(?:led|managed|developed|built|designed|implemented|improved|created|launched|delivered)\b",
        ),
    },
    ChecklistRule {
        id: "links",
        label: "Professional links (LinkedIn, GitHub, portfolio)",
        keywords: &["linkedin", "github", "portfolio"],
        pattern: None,
    },
    ChecklistRule {
        id: "certifications",
        label: "Certifications",
        keywords: &["certification", "certified", "certificate"],
        pattern: None,
    },
];

// Compiled once, indexed like RULES.
static COMPILED: Lazy<Vec<Option<Regex>>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| rule.pattern.map(|p| Regex::new(p).unwrap()))
        .collect()
});

/// Evaluate every rule in [`RULES`] against `text`.
pub fn evaluate(text: &str) -> Vec<ChecklistResult> {
    let haystack = text.to_lowercase();
    RULES
        .iter()
        .zip(COMPILED.iter())
        .map(|(rule, regex)| ChecklistResult {
            id: rule.id.to_string(),
            label: rule.label.to_string(),
            present: rule_matches(rule, regex.as_ref(), &haystack),
        })
        .collect()
}

fn rule_matches(rule: &ChecklistRule, regex: Option<&Regex>, haystack: &str) -> bool {
    if haystack.is_empty() {
        return false;
    }
    rule.keywords.iter().any(|k| haystack.contains(k))
        || regex.is_some_and(|re| re.is_match(haystack))
}
