//! Output types: the validated analysis and the combined report.
//!
//! [`AnalysisResult`] mirrors the JSON object requested in
//! [`crate::prompts::ANALYZE_RESUME_PROMPT`]. Only `overallScore` is required.
//! Every other field is `Option` so that "the model did not say" stays
//! distinguishable from an empty list or a zero; the accessor methods return
//! `None` for data that is not available and never substitute defaults.
//!
//! Model output is loosely typed in practice (`"8"` instead of `8`, numbers
//! inside string lists), so the field deserialisers accept the common shapes
//! and reject only what cannot be interpreted.

use crate::checklist::ChecklistResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// How many strengths / improvements a consumer shows.
pub const TOP_N: usize = 3;

/// Validated payload returned by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall score, nominally 1–10.
    #[serde(deserialize_with = "de_score")]
    pub overall_score: f64,
    /// `[latest, earliest]`.
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Vec<String>>,
    /// `[total, domain]`.
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub improvements: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Metric key → value in 0–10.
    #[serde(default, deserialize_with = "de_metrics", skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub pro_tips: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_text_list", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl AnalysisResult {
    /// Band for the overall score.
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall_score)
    }

    pub fn latest_qualification(&self) -> Option<&str> {
        nth(&self.qualification, 0)
    }

    pub fn earliest_qualification(&self) -> Option<&str> {
        nth(&self.qualification, 1)
    }

    pub fn total_experience(&self) -> Option<&str> {
        nth(&self.experience, 0)
    }

    pub fn domain_experience(&self) -> Option<&str> {
        nth(&self.experience, 1)
    }

    /// First [`TOP_N`] strengths, or `None` when the model gave none.
    pub fn top_strengths(&self) -> Option<&[String]> {
        top(&self.strengths)
    }

    /// First [`TOP_N`] improvement areas, or `None` when the model gave none.
    pub fn top_improvements(&self) -> Option<&[String]> {
        top(&self.improvements)
    }

    pub fn action_items(&self) -> Option<&[String]> {
        non_empty(&self.action_items)
    }

    pub fn pro_tips(&self) -> Option<&[String]> {
        non_empty(&self.pro_tips)
    }

    pub fn recommended_keywords(&self) -> Option<&[String]> {
        non_empty(&self.keywords)
    }

    /// One reading per entry of [`METRIC_CONFIG`], in table order.
    pub fn metric_readings(&self) -> Vec<MetricReading> {
        METRIC_CONFIG
            .iter()
            .map(|cfg| MetricReading {
                key: cfg.key,
                label: cfg.label,
                value: self
                    .performance_metrics
                    .as_ref()
                    .and_then(|m| m.get(cfg.key).copied()),
            })
            .collect()
    }
}

fn nth(list: &Option<Vec<String>>, i: usize) -> Option<&str> {
    list.as_ref()
        .and_then(|l| l.get(i))
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn non_empty(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

fn top(list: &Option<Vec<String>>) -> Option<&[String]> {
    non_empty(list).map(|l| &l[..l.len().min(TOP_N)])
}

/// Qualitative band for an overall score (integer part: ≥ 8, ≥ 6, below).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        let whole = score.trunc();
        if whole >= 8.0 {
            ScoreBand::Excellent
        } else if whole >= 6.0 {
            ScoreBand::Good
        } else {
            ScoreBand::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsImprovement => "Needs improvement",
        }
    }
}

/// Display configuration for one performance metric.
#[derive(Debug)]
pub struct MetricConfig {
    pub key: &'static str,
    pub label: &'static str,
}

/// Metric display table, in display order.
pub const METRIC_CONFIG: &[MetricConfig] = &[
    MetricConfig { key: "formatting", label: "Formatting" },
    MetricConfig { key: "contentQuality", label: "Content Quality" },
    MetricConfig { key: "keywordUsage", label: "Keyword Usage" },
    MetricConfig { key: "atsCompatibility", label: "ATS Compatibility" },
    MetricConfig { key: "quantifiableAchievements", label: "Quantifiable Achievements" },
];

/// A metric resolved against [`METRIC_CONFIG`]; `value` is `None` when not reported.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
}

/// Token counts reported by the generation service for the single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// The terminal output of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Number of pages the document had.
    pub page_count: usize,
    /// Extracted text, pages joined with `\n`, trimmed.
    pub text: String,
    /// Checklist outcomes in rule-table order.
    pub checklist: Vec<ChecklistResult>,
    pub analysis: AnalysisResult,
    pub usage: TokenUsage,
}

/// Output of [`crate::analyze::screen`]: extraction and checklist only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub page_count: usize,
    pub text: String,
    pub checklist: Vec<ChecklistResult>,
}

// ── Lenient field deserialisers ──────────────────────────────────────────

fn number_from(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches("/10").trim().parse().ok(),
        _ => None,
    }
}

fn text_from(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_score<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    number_from(&value)
        .filter(|n| n.is_finite())
        .ok_or_else(|| serde::de::Error::custom(format!("overallScore is not a number: {value}")))
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.and_then(text_from).filter(|s| !s.trim().is_empty()))
}

fn de_text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Array(items)) => {
            Ok(Some(items.into_iter().filter_map(text_from).collect()))
        }
        // A lone string where a list was asked for.
        Some(serde_json::Value::String(s)) => Ok(Some(vec![s])),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a list of strings, got {other}"
        ))),
    }
}

fn de_metrics<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => Ok(Some(
            map.into_iter()
                .filter_map(|(k, v)| {
                    number_from(&v)
                        .filter(|n| n.is_finite())
                        .map(|n| (k, n.clamp(0.0, 10.0)))
                })
                .collect(),
        )),
        Some(other) => Err(serde::de::Error::custom(format!(
            "performanceMetrics must be an object, got {other}"
        ))),
    }
}
