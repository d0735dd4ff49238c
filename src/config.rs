//! Configuration for a resume analysis.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. The rule table, prompt template and metric
//! table are fixed process-wide configuration and live in their own modules;
//! this struct only carries the per-deployment knobs (which model, which
//! provider, where pdfium lives) and the injectable collaborators.

use crate::error::AnalyzerError;
use crate::pipeline::extract::TextLayer;
use crate::pipeline::service::GenerationService;
use crate::progress::ObserverHandle;
use crate::prompts::DEFAULT_MODEL;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a resume analysis.
///
/// # Example
/// ```rust
/// use resume_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Generation model identifier. Default: `gpt-4o`.
    pub model: String,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `service`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed generation service. Takes precedence over `provider_name`.
    pub service: Option<Arc<dyn GenerationService>>,

    /// Pre-constructed text layer. Default: pdfium.
    pub text_layer: Option<Arc<dyn TextLayer>>,

    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,

    /// Maximum completion tokens. None leaves the provider default.
    pub max_tokens: Option<usize>,

    /// Explicit path to the pdfium shared library.
    /// Falls back to `PDFIUM_LIB_PATH`, then the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Run observer. Default: none.
    pub observer: Option<ObserverHandle>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            service: None,
            text_layer: None,
            temperature: None,
            max_tokens: None,
            pdfium_lib_path: None,
            download_timeout_secs: 120,
            observer: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("service", &self.service.as_ref().map(|_| "<dyn GenerationService>"))
            .field("text_layer", &self.text_layer.as_ref().map(|_| "<dyn TextLayer>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn text_layer(mut self, layer: Arc<dyn TextLayer>) -> Self {
        self.config.text_layer = Some(layer);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn observer(mut self, observer: ObserverHandle) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_tokens == Some(0) {
            return Err(AnalyzerError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.download_timeout_secs == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
