//! # resume-analyzer
//!
//! Score a PDF resume: deterministic presence checks plus an LLM review.
//!
//! ## Why two analyses?
//!
//! Applicant tracking systems reject resumes for mechanical reasons (no
//! contact line, no skills section) long before anyone reads them. Those
//! checks are cheap and reproducible, so they run locally against the
//! extracted text. Judging the *content* needs a language model. A report
//! carries both, and either half can be read without the other.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL; gate on media type
//!  ├─ 2. Extract    page text via pdfium (spawn_blocking), joined in page order
//!  ├─ 3. Checklist  fixed keyword / pattern rules over the text
//!  ├─ 4. Request    text substituted into the versioned prompt template
//!  ├─ 5. Generate   one call to gpt-4o / claude / gemini / …
//!  └─ 6. Validate   locate the JSON payload in the reply and type it
//! ```
//!
//! A run yields a complete [`PipelineReport`] or exactly one
//! [`AnalyzerError`]; there are no partial reports.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_analyzer::{analyze, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = AnalyzerConfig::default();
//!     let report = analyze("resume.pdf", &config).await?;
//!     println!("{} ({})", report.analysis.overall_score, report.analysis.score_band().label());
//!     for rule in &report.checklist {
//!         println!("{} {}", if rule.present { "✓" } else { "✗" }, rule.label);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-analyzer` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! resume-analyzer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod checklist;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_document, analyze_sync, analyze_to_file, screen, AnalysisRun, Analyzer,
    RunState,
};
pub use checklist::{ChecklistResult, ChecklistRule, RULES};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use error::{AnalyzerError, ErrorKind, ResponseParseError};
pub use pipeline::extract::{PageText, PdfiumTextLayer, TextLayer};
pub use pipeline::input::{resolve_input, Document, PDF_MEDIA_TYPE};
pub use pipeline::request::{AnalysisRequest, ChatRole, RequestMessage};
pub use pipeline::service::{GenerationService, LlmService, ServiceReply};
pub use pipeline::validate::parse_reply;
pub use progress::{NoopObserver, ObserverHandle, RunObserver};
pub use report::{
    AnalysisResult, MetricReading, PipelineReport, Screening, ScoreBand, TokenUsage, METRIC_CONFIG,
};
