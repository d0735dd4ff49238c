//! Orchestration: one upload in, one [`PipelineReport`] or one error out.
//!
//! ## Why an `Analyzer` handle?
//!
//! Resolving the generation service reads the environment and may construct
//! an HTTP client. Doing it once in [`Analyzer::new`] turns "is the model
//! ready?" into a one-shot check with a clear error, and lets a caller reuse
//! the handle across uploads. Each [`Analyzer::run`] owns a fresh
//! [`AnalysisRun`]; nothing carries over between runs.
//!
//! The free functions ([`analyze`], [`analyze_document`], [`analyze_sync`],
//! [`analyze_to_file`], [`screen`]) are conveniences over the handle.

use crate::checklist;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::extract::{extract_text, PdfiumTextLayer, TextLayer};
use crate::pipeline::input::{self, Document};
use crate::pipeline::request::build_request;
use crate::pipeline::service::{resolve_service, GenerationService};
use crate::pipeline::validate::parse_service_reply;
use crate::progress::{NoopObserver, ObserverHandle};
use crate::report::{PipelineReport, Screening};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a run is. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Extracting,
    ChecklistEvaluating,
    RequestingAnalysis,
    Validating,
    Complete,
    Failed(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Extracting => f.write_str("extracting text"),
            RunState::ChecklistEvaluating => f.write_str("evaluating checklist"),
            RunState::RequestingAnalysis => f.write_str("requesting analysis"),
            RunState::Validating => f.write_str("validating reply"),
            RunState::Complete => f.write_str("complete"),
            RunState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// The record of a single run: its current state and every state it passed through.
pub struct AnalysisRun {
    state: RunState,
    history: Vec<RunState>,
    observer: ObserverHandle,
}

impl AnalysisRun {
    /// Start a clean run in `Idle`.
    pub fn start(observer: ObserverHandle) -> Self {
        observer.on_state(&RunState::Idle);
        Self {
            state: RunState::Idle,
            history: vec![RunState::Idle],
            observer,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Move to `next`. Terminal runs do not move.
    pub fn advance(&mut self, next: RunState) {
        if self.state.is_terminal() {
            warn!("Ignoring transition to '{}' from terminal state '{}'", next, self.state);
            return;
        }
        debug!("Run state: {} → {}", self.state, next);
        self.observer.on_state(&next);
        self.history.push(next.clone());
        self.state = next;
    }

    pub fn fail(&mut self, error: &AnalyzerError) {
        self.advance(RunState::Failed(error.to_string()));
    }
}

impl fmt::Debug for AnalysisRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRun")
            .field("state", &self.state)
            .field("history", &self.history)
            .finish()
    }
}

/// A ready-to-run analyzer: configuration plus resolved collaborators.
pub struct Analyzer {
    config: AnalyzerConfig,
    service: Arc<dyn GenerationService>,
    text_layer: Arc<dyn TextLayer>,
}

impl Analyzer {
    /// Resolve the generation service and the text layer.
    ///
    /// Fails with [`AnalyzerError::ProviderNotConfigured`] when no model
    /// provider is available; no document is touched.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let service = resolve_service(&config)?;
        let text_layer = text_layer_for(&config);
        info!("Analyzer ready (model {})", config.model);
        Ok(Self {
            config,
            service,
            text_layer,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one document.
    ///
    /// A non-PDF document is rejected before the run starts: no state is
    /// entered and the text layer is never called.
    pub async fn run(&self, document: Document) -> Result<PipelineReport, AnalyzerError> {
        document.ensure_pdf()?;
        info!(
            "Starting analysis: {} ({} bytes)",
            document.name().unwrap_or("<unnamed>"),
            document.bytes().len()
        );

        let mut run = AnalysisRun::start(observer_for(&self.config));
        match self.drive(&mut run, document).await {
            Ok(report) => {
                run.advance(RunState::Complete);
                info!(
                    "Analysis complete: score {} ({})",
                    report.analysis.overall_score,
                    report.analysis.score_band().label()
                );
                Ok(report)
            }
            Err(e) => {
                warn!("Analysis failed: {}", e);
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        run: &mut AnalysisRun,
        document: Document,
    ) -> Result<PipelineReport, AnalyzerError> {
        let observer = Arc::clone(&run.observer);

        // ── Extract ──────────────────────────────────────────────────────────
        run.advance(RunState::Extracting);
        let extracted = extract_text(Arc::clone(&self.text_layer), document.into_bytes()).await?;
        observer.on_text_extracted(extracted.page_count, extracted.text.chars().count());

        // ── Checklist ────────────────────────────────────────────────────────
        run.advance(RunState::ChecklistEvaluating);
        let checklist = checklist::evaluate(&extracted.text);
        debug!(
            "Checklist: {}/{} rules present",
            checklist.iter().filter(|r| r.present).count(),
            checklist.len()
        );

        // ── Request ──────────────────────────────────────────────────────────
        run.advance(RunState::RequestingAnalysis);
        let request = build_request(&extracted.text, &self.config.model);
        let reply = self.service.generate(&request).await?;
        observer.on_reply_received(reply.content().len());

        // ── Validate ─────────────────────────────────────────────────────────
        run.advance(RunState::Validating);
        let analysis = parse_service_reply(&reply)?;

        Ok(PipelineReport {
            page_count: extracted.page_count,
            text: extracted.text,
            checklist,
            analysis,
            usage: reply.usage(),
        })
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").field("config", &self.config).finish()
    }
}

fn text_layer_for(config: &AnalyzerConfig) -> Arc<dyn TextLayer> {
    match config.text_layer {
        Some(ref layer) => Arc::clone(layer),
        None => Arc::new(PdfiumTextLayer::new(config.pdfium_lib_path.clone())),
    }
}

fn observer_for(config: &AnalyzerConfig) -> ObserverHandle {
    match config.observer {
        Some(ref o) => Arc::clone(o),
        None => Arc::new(NoopObserver),
    }
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Analyze a resume given as a local path or HTTP/HTTPS URL.
///
/// # Example
/// ```rust,no_run
/// use resume_analyzer::{analyze, AnalyzerConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = analyze("resume.pdf", &AnalyzerConfig::default()).await?;
/// println!("{} / 10", report.analysis.overall_score);
/// # Ok(())
/// # }
/// ```
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &AnalyzerConfig,
) -> Result<PipelineReport, AnalyzerError> {
    let document =
        input::resolve_input(input_str.as_ref(), None, config.download_timeout_secs).await?;
    analyze_document(document, config).await
}

/// Analyze an in-memory document.
pub async fn analyze_document(
    document: Document,
    config: &AnalyzerConfig,
) -> Result<PipelineReport, AnalyzerError> {
    document.ensure_pdf()?;
    Analyzer::new(config.clone())?.run(document).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalyzerConfig,
) -> Result<PipelineReport, AnalyzerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(input_str, config))
}

/// Analyze and write the report as pretty JSON.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial report behind.
pub async fn analyze_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AnalyzerConfig,
) -> Result<PipelineReport, AnalyzerError> {
    let report = analyze(input_str, config).await?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| AnalyzerError::Internal(format!("Failed to serialise report: {}", e)))?;
    write_atomic(output_path.as_ref(), json.as_bytes()).await?;
    Ok(report)
}

/// Extract and run the checklist without calling a model.
///
/// Needs no provider or API key.
pub async fn screen(
    document: Document,
    config: &AnalyzerConfig,
) -> Result<Screening, AnalyzerError> {
    document.ensure_pdf()?;
    let extracted = extract_text(text_layer_for(config), document.into_bytes()).await?;
    let checklist = checklist::evaluate(&extracted.text);
    Ok(Screening {
        page_count: extracted.page_count,
        text: extracted.text,
        checklist,
    })
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AnalyzerError> {
    let write_err = |e: std::io::Error| AnalyzerError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
