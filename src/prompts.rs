//! Prompts for the resume review request.
//!
//! Both the system instruction and the user template are process-wide,
//! versioned configuration. The template carries exactly one substitution
//! placeholder, [`DOCUMENT_TEXT_PLACEHOLDER`]; [`crate::pipeline::request`]
//! fills it and nothing else.
//!
//! The JSON field names requested here are the contract that
//! [`crate::report::AnalysisResult`] deserialises, and the metric keys must
//! match [`crate::report::METRIC_CONFIG`]. Unit tests below pin both.

/// Bumped whenever the template or system instruction changes wording.
pub const PROMPT_VERSION: &str = "2";

/// The single placeholder in [`ANALYZE_RESUME_PROMPT`].
pub const DOCUMENT_TEXT_PLACEHOLDER: &str = "{{DOCUMENT_TEXT}}";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// System instruction sent ahead of every analysis request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert resume reviewer and career coach. \
You evaluate resumes the way recruiters and Applicant Tracking Systems do, and you answer \
with a single JSON object and nothing else.";

/// User-message template. `{{DOCUMENT_TEXT}}` is replaced with the extracted resume text.
pub const ANALYZE_RESUME_PROMPT: &str = r#"Analyze the resume text below and return ONLY a JSON object with this exact structure:

{
  "overallScore": <number from 1 to 10>,
  "qualification": ["<latest qualification>", "<earliest qualification>"],
  "experience": ["<total experience, e.g. 4 years>", "<main domain>"],
  "strengths": ["<strength>", "<strength>", "<strength>"],
  "improvements": ["<improvement>", "<improvement>", "<improvement>"],
  "summary": "<two or three sentence executive summary>",
  "performanceMetrics": {
    "formatting": <number from 0 to 10>,
    "contentQuality": <number from 0 to 10>,
    "keywordUsage": <number from 0 to 10>,
    "atsCompatibility": <number from 0 to 10>,
    "quantifiableAchievements": <number from 0 to 10>
  },
  "actionItems": ["<specific next step>", "<specific next step>", "<specific next step>"],
  "proTips": ["<tip>", "<tip>", "<tip>"],
  "keywords": ["<recommended keyword>", "<recommended keyword>"]
}

Rules:
- Order strengths and improvements from most to least important.
- Leave out "qualification" or "experience" when the resume does not state them.
- If the text is empty or is not a resume, return {"error": "<short reason>"} instead.
- Do not wrap the JSON in code fences and do not add commentary.

Resume text:
"""
{{DOCUMENT_TEXT}}
""""#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::METRIC_CONFIG;

    #[test]
    fn template_has_exactly_one_placeholder() {
        assert_eq!(ANALYZE_RESUME_PROMPT.matches(DOCUMENT_TEXT_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn template_requests_every_metric_key() {
        for cfg in METRIC_CONFIG {
            assert!(
                ANALYZE_RESUME_PROMPT.contains(&format!("\"{}\"", cfg.key)),
                "prompt does not request metric '{}'",
                cfg.key
            );
        }
    }

    #[test]
    fn template_requests_score_and_error_contract() {
        assert!(ANALYZE_RESUME_PROMPT.contains("\"overallScore\""));
        assert!(ANALYZE_RESUME_PROMPT.contains("\"error\""));
    }
}
