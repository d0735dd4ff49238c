//! Error types for the resume-analyzer library.
//!
//! Two error types reflect two layers of failure:
//!
//! * [`AnalyzerError`] — **Fatal for the run**: every stage failure aborts the
//!   run and surfaces exactly one of these. A run yields either a complete
//!   [`crate::report::PipelineReport`] or one `AnalyzerError`, never both.
//!
//! * [`ResponseParseError`] — **Why a model reply was rejected**: missing
//!   payload, malformed payload, or a payload without the required score.
//!   Always wrapped in [`AnalyzerError::ResponseParse`] before it leaves the
//!   pipeline.
//!
//! [`AnalyzerError::kind`] collapses the variants into the four-way taxonomy
//! the presentation layer branches on, plus `Environment` for setup problems
//! (missing file, unreachable provider, pdfium not installed).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Declared media type is not PDF; rejected before extraction starts.
    #[error("Please upload a PDF file only (got '{media_type}')")]
    InvalidInputType { media_type: String },

    /// Input file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document could not be read as a PDF (corrupt, encrypted, unsupported).
    #[error("Could not extract text from the PDF: {detail}")]
    Extraction { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs a PDFium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Install libpdfium into a system library directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Generation service errors ─────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The single call to the generation service failed in transport.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The generation service answered with an explicit `error` field.
    #[error("{message}")]
    AnalysisService { message: String },

    /// The generation service's reply could not be interpreted.
    #[error("Failed to parse AI response: {0}")]
    ResponseParse(#[from] ResponseParseError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a generation-service reply was not accepted as an analysis.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    /// The brace-delimited payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// No payload, or a payload with neither `overallScore` nor `error`.
    #[error("Invalid AI Response: no overallScore in reply")]
    MissingScore,

    /// A score is present but a field has an unusable shape.
    #[error("payload has an invalid field: {0}")]
    InvalidField(#[source] serde_json::Error),
}

/// Coarse error taxonomy for callers that only need to branch on the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-PDF upload; the pipeline never started.
    InvalidInputType,
    /// Unreadable or corrupt document.
    Extraction,
    /// The remote service explicitly reported an error.
    AnalysisService,
    /// The remote reply could not be interpreted.
    ResponseParse,
    /// Setup and transport problems outside the four pipeline classes.
    Environment,
}

impl AnalyzerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::InvalidInputType { .. } => ErrorKind::InvalidInputType,
            AnalyzerError::Extraction { .. } => ErrorKind::Extraction,
            AnalyzerError::AnalysisService { .. } => ErrorKind::AnalysisService,
            AnalyzerError::ResponseParse(_) => ErrorKind::ResponseParse,
            _ => ErrorKind::Environment,
        }
    }
}
