//! Response validation: free-form model reply → [`AnalysisResult`].
//!
//! Models wrap their JSON in commentary ("Sure! Here is the analysis: ...")
//! or code fences, so the reply is never decoded whole. Instead the reply is
//! scanned left to right for outermost brace-balanced spans; braces inside
//! JSON strings do not count. The first span is the payload; later spans
//! are never consulted, even when the first one fails to decode.
//!
//! ```text
//!  reply ──► first outermost {…} span ──► decode ──► error field? ──► overallScore? ──► AnalysisResult
//!               │ none                       │ fails      │ yes               │ no
//!               ▼                            ▼            ▼                   ▼
//!          MissingScore                 Decode(err)  AnalysisService       MissingScore
//! ```
//!
//! An opening brace that never closes is decoded as-is so the truncation
//! surfaces as a decode error rather than as "no payload".

use crate::error::{AnalyzerError, ResponseParseError};
use crate::pipeline::service::ServiceReply;
use crate::report::AnalysisResult;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Validate a service reply of either shape.
pub fn parse_service_reply(reply: &ServiceReply) -> Result<AnalysisResult, AnalyzerError> {
    parse_reply(reply.content())
}

/// Locate, decode and validate the structured payload inside `raw`.
pub fn parse_reply(raw: &str) -> Result<AnalysisResult, AnalyzerError> {
    let payload = locate_payload(raw)?;
    validate_payload(payload)
}

/// Every outermost brace-balanced span of `text`, left to right.
///
/// A trailing unbalanced span (opening brace, no matching close) is yielded
/// last, running to the end of the text.
pub fn object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_end(&text[start..]) {
            Some(len) => {
                spans.push(&text[start..start + len]);
                pos = start + len;
            }
            None => {
                spans.push(&text[start..]);
                break;
            }
        }
    }
    spans
}

/// Byte length of the brace-balanced object at the start of `s`, if it closes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the first outermost span. No span at all is an empty payload.
fn locate_payload(raw: &str) -> Result<Map<String, Value>, ResponseParseError> {
    let Some(span) = object_spans(raw).into_iter().next() else {
        debug!("Reply contains no braces ({} chars)", raw.len());
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => {
            if span.len() < raw.trim().len() {
                warn!("Reply has text around its payload ({} of {} chars)", span.len(), raw.len());
            }
            Ok(map)
        }
        // A span opens with `{`, so anything that decodes is an object.
        Ok(_) => Ok(Map::new()),
        Err(e) => {
            warn!("Payload does not decode ({} chars): {}", span.len(), e);
            Err(ResponseParseError::Decode(e))
        }
    }
}

fn validate_payload(payload: Map<String, Value>) -> Result<AnalysisResult, AnalyzerError> {
    if let Some(error) = payload.get("error").filter(|v| is_set(v)) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        warn!("Analysis service reported an error: {}", message);
        return Err(AnalyzerError::AnalysisService { message });
    }

    if !payload.get("overallScore").is_some_and(is_set) {
        return Err(ResponseParseError::MissingScore.into());
    }

    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ResponseParseError::InvalidField(e).into())
}

/// `null`, `false` and `""` count as absent.
fn is_set(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::report::TokenUsage;

    #[test]
    fn payload_embedded_in_prose() {
        let reply = r#"Sure! Here is my review: {"overallScore": 8, "summary": "ok"} Hope it helps."#;
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.overall_score, 8.0);
        assert_eq!(result.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn payload_in_code_fence() {
        let reply = "```json\n{\n  \"overallScore\": 6,\n  \"strengths\": [\"Clear layout\"]\n}\n```";
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.overall_score, 6.0);
        assert_eq!(result.top_strengths().map(<[String]>::len), Some(1));
    }

    #[test]
    fn explicit_error_becomes_service_error() {
        let err = parse_reply(r#"{"error": "no text supplied"}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::AnalysisService { ref message } if message == "no text supplied"));
        assert_eq!(err.kind(), ErrorKind::AnalysisService);
    }

    #[test]
    fn error_wins_over_score() {
        let err = parse_reply(r#"{"overallScore": 5, "error": "not a resume"}"#).unwrap_err();
        assert_eq!(err.to_string(), "not a resume");
    }

    #[test]
    fn no_braces_is_missing_score() {
        let err = parse_reply("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::MissingScore)));
    }

    #[test]
    fn broken_payload_wraps_decode_error() {
        let err = parse_reply(r#"Result: {"overallScore": 8, "summary": }"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))), "got {err:?}");
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let err = parse_reply(r#"{"overallScore": 8, "summary": "the candidate"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))), "got {err:?}");
    }

    #[test]
    fn broken_draft_before_valid_object_is_a_decode_error() {
        let reply = r#"Draft: {"overallScore": 8, "summary": } Final: {"overallScore": 3}"#;
        let err = parse_reply(reply).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))), "got {err:?}");
    }

    #[test]
    fn first_of_two_objects_wins() {
        let reply = r#"{"overallScore": 5, "summary": "first"} and later {"overallScore": 9}"#;
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.overall_score, 5.0);
        assert_eq!(result.summary.as_deref(), Some("first"));
    }

    #[test]
    fn prose_braces_before_payload_fail_decoding() {
        let reply = r#"Scores use the form {score}/10. {"overallScore": 7}"#;
        let err = parse_reply(reply).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))), "got {err:?}");
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let reply = r#"{"overallScore": 9, "summary": "uses } and { freely \" ok"}"#;
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.summary.as_deref(), Some("uses } and { freely \" ok"));
    }

    #[test]
    fn object_without_score_or_error() {
        let err = parse_reply(r#"{"summary": "fine"}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::MissingScore)));
    }

    #[test]
    fn null_score_is_missing() {
        let err = parse_reply(r#"{"overallScore": null}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::MissingScore)));
    }

    #[test]
    fn unusable_field_is_invalid_field() {
        let err = parse_reply(r#"{"overallScore": 7, "performanceMetrics": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::ResponseParse(ResponseParseError::InvalidField(_))));
    }

    #[test]
    fn spans_are_outermost_only() {
        let spans = object_spans(r#"a {"x": {"y": 1}} b {"z": 2} c {"#);
        assert_eq!(spans, vec![r#"{"x": {"y": 1}}"#, r#"{"z": 2}"#, "{"]);
    }

    #[test]
    fn message_reply_without_content_is_missing_score() {
        let reply = ServiceReply::Message {
            content: None,
            usage: TokenUsage::default(),
        };
        let err = parse_service_reply(&reply).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseParse);
    }
}
