//! Request construction: extracted text → role-tagged chat messages.
//!
//! Deterministic for a given text and prompt version. All wording lives in
//! [`crate::prompts`].

use crate::prompts::{ANALYZE_RESUME_PROMPT, DOCUMENT_TEXT_PLACEHOLDER, SYSTEM_INSTRUCTION};
use serde::Serialize;

/// Role of one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A complete analysis request: ordered messages plus the target model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
}

impl AnalysisRequest {
    /// The user message content (the filled template).
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Build the request for `text`, targeting `model`.
///
/// The text is substituted verbatim, once; an empty text yields a prompt
/// with an empty document section.
pub fn build_request(text: &str, model: &str) -> AnalysisRequest {
    let prompt = ANALYZE_RESUME_PROMPT.replacen(DOCUMENT_TEXT_PLACEHOLDER, text, 1);
    AnalysisRequest {
        model: model.to_string(),
        messages: vec![
            RequestMessage {
                role: ChatRole::System,
                content: SYSTEM_INSTRUCTION.to_string(),
            },
            RequestMessage {
                role: ChatRole::User,
                content: prompt,
            },
        ],
    }
}
