//! Generation service: the remote model that writes the qualitative review.
//!
//! The orchestrator only sees [`GenerationService`]: send an
//! [`AnalysisRequest`], get back a [`ServiceReply`] (either a bare string or
//! a message object carrying content). [`LlmService`] adapts any
//! `edgequake_llm` provider to that seam; tests and embedders can supply
//! their own implementation through
//! [`crate::config::AnalyzerConfigBuilder::service`].
//!
//! One attempt per run. No retry and no timeout are applied here: a hung
//! provider hangs the run.
//!
//! An `edgequake_llm` provider is bound to its model when it is built, so
//! [`AnalysisRequest::model`] cannot switch models per call. When the two
//! disagree (an auto-detected provider with its own default, say) the
//! provider's model is what runs, and the mismatch is logged.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::request::{AnalysisRequest, ChatRole};
use crate::report::TokenUsage;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the generation service sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    /// A plain string reply.
    Text(String),
    /// A response object; `content` may be missing.
    Message {
        content: Option<String>,
        usage: TokenUsage,
    },
}

impl ServiceReply {
    /// The textual content, or `""` when the message carried none.
    pub fn content(&self) -> &str {
        match self {
            ServiceReply::Text(s) => s,
            ServiceReply::Message { content, .. } => content.as_deref().unwrap_or(""),
        }
    }

    pub fn usage(&self) -> TokenUsage {
        match self {
            ServiceReply::Text(_) => TokenUsage::default(),
            ServiceReply::Message { usage, .. } => *usage,
        }
    }
}

/// A remote text-generation collaborator.
pub trait GenerationService: Send + Sync {
    /// Send `request` once and return the raw reply.
    fn generate<'a>(
        &'a self,
        request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<ServiceReply, AnalyzerError>>;
}

/// [`GenerationService`] over an `edgequake_llm` provider.
pub struct LlmService {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmService {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

impl GenerationService for LlmService {
    fn generate<'a>(
        &'a self,
        request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<ServiceReply, AnalyzerError>> {
        Box::pin(async move {
            let messages: Vec<ChatMessage> = request
                .messages
                .iter()
                .map(|m| match m.role {
                    ChatRole::System => ChatMessage::system(m.content.as_str()),
                    ChatRole::User => ChatMessage::user(m.content.as_str()),
                })
                .collect();

            let serving = self.provider.model();
            if !same_model(&request.model, serving) {
                warn!(
                    "Request names model {} but provider {} serves {}; using {}",
                    request.model,
                    self.provider.name(),
                    serving,
                    serving
                );
            }
            debug!("Sending {} messages to model {}", messages.len(), serving);
            let response = self
                .provider
                .chat(&messages, Some(&self.options))
                .await
                .map_err(|e| AnalyzerError::LlmApiError {
                    message: e.to_string(),
                })?;

            debug!(
                "Reply: {} input tokens, {} output tokens",
                response.prompt_tokens, response.completion_tokens
            );
            Ok(ServiceReply::Message {
                content: Some(response.content),
                usage: TokenUsage {
                    prompt_tokens: response.prompt_tokens,
                    completion_tokens: response.completion_tokens,
                },
            })
        })
    }
}

/// Whether a provider serving `serving` runs the model named `requested`.
/// Provider-qualified ids (`openai/gpt-4o`) match their bare name.
fn same_model(requested: &str, serving: &str) -> bool {
    let bare = |id: &str| id.rsplit('/').next().unwrap_or(id).to_ascii_lowercase();
    bare(requested) == bare(serving)
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &AnalyzerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

/// Resolve the generation service, from most-specific to least-specific.
///
/// 1. **Pre-built service** (`config.service`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`.
/// 3. **`RESUME_ANALYZER_PROVIDER`** env var with `config.model`.
/// 4. **`OPENAI_API_KEY`** present → OpenAI with `config.model`.
/// 5. **Full auto-detection** via `ProviderFactory::from_env`.
///
/// Resolution is the readiness check: it runs once, when an
/// [`crate::analyze::Analyzer`] is built, and fails fast instead of polling.
pub fn resolve_service(config: &AnalyzerConfig) -> Result<Arc<dyn GenerationService>, AnalyzerError> {
    if let Some(ref service) = config.service {
        return Ok(Arc::clone(service));
    }

    let provider = resolve_provider(config)?;
    Ok(Arc::new(LlmService::new(provider, config)))
}

fn resolve_provider(config: &AnalyzerConfig) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    if let Some(ref name) = config.provider_name {
        return create_provider(name, &config.model);
    }

    if let Ok(prov) = std::env::var("RESUME_ANALYZER_PROVIDER") {
        if !prov.is_empty() {
            return create_provider(&prov, &config.model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", &config.model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    if !same_model(&config.model, llm_provider.model()) {
        warn!(
            "Auto-detected provider {} uses model {}, not the configured {}",
            llm_provider.name(),
            llm_provider.model(),
            config.model
        );
    }
    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AnalyzerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
