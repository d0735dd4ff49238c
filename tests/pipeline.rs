//! Pipeline integration tests with stub collaborators.
//!
//! No pdfium and no network: the text layer and the generation service are
//! replaced by deterministic stubs, so every test here runs in CI.
//!
//! Run with:
//!   cargo test --test pipeline

use futures::future::BoxFuture;
use resume_analyzer::{
    analyze_document, AnalysisRequest, Analyzer, AnalyzerConfig, AnalyzerError, ChatRole,
    Document, ErrorKind, GenerationService, PageText, ResponseParseError, RunObserver, RunState,
    ServiceReply, TextLayer, TokenUsage, PDF_MEDIA_TYPE, RULES,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Text layer that returns fixed pages and counts calls.
struct StubPages {
    pages: Vec<Vec<&'static str>>,
    calls: AtomicUsize,
}

impl StubPages {
    fn new(pages: Vec<Vec<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            pages,
            calls: AtomicUsize::new(0),
        })
    }
}

impl TextLayer for StubPages {
    fn read_pages(&self, _bytes: &[u8]) -> Result<Vec<PageText>, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(index, fragments)| PageText {
                index,
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
            })
            .collect())
    }
}

/// Text layer that fails like a corrupt document.
struct Corrupt;

impl TextLayer for Corrupt {
    fn read_pages(&self, _bytes: &[u8]) -> Result<Vec<PageText>, AnalyzerError> {
        Err(AnalyzerError::Extraction {
            detail: "unreadable document (xref table missing)".into(),
        })
    }
}

/// Generation service with a canned reply; records every request it sees.
struct StubService {
    reply: Result<ServiceReply, String>,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl StubService {
    fn text(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ServiceReply::Text(reply.to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn message(reply: &str, prompt_tokens: usize, completion_tokens: usize) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ServiceReply::Message {
                content: Some(reply.to_string()),
                usage: TokenUsage {
                    prompt_tokens,
                    completion_tokens,
                },
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl GenerationService for StubService {
    fn generate<'a>(
        &'a self,
        request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<ServiceReply, AnalyzerError>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .map_err(|message| AnalyzerError::LlmApiError { message })
        })
    }
}

#[derive(Default)]
struct StateLog(Mutex<Vec<RunState>>);

impl RunObserver for StateLog {
    fn on_state(&self, state: &RunState) {
        self.0.lock().unwrap().push(state.clone());
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pdf_document() -> Document {
    Document::new(b"%PDF-1.7\n%stub".to_vec(), PDF_MEDIA_TYPE).with_name("resume.pdf")
}

fn config(layer: Arc<dyn TextLayer>, service: Arc<dyn GenerationService>) -> AnalyzerConfig {
    AnalyzerConfig::builder()
        .text_layer(layer)
        .service(service)
        .build()
        .expect("valid config")
}

fn present(report_checklist: &[resume_analyzer::ChecklistResult], id: &str) -> bool {
    report_checklist
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.present)
        .unwrap_or_else(|| panic!("rule '{id}' missing from checklist"))
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_one_page_resume_with_score() {
    let layer = StubPages::new(vec![vec!["Python,", "AWS,", "5 years experience"]]);
    let service = StubService::text(r#"{"overallScore": 7, "summary": "Solid backend profile"}"#);

    let report = analyze_document(pdf_document(), &config(layer, service.clone()))
        .await
        .expect("report");

    assert_eq!(report.page_count, 1);
    assert_eq!(report.text, "Python, AWS, 5 years experience");
    assert_eq!(report.checklist.len(), RULES.len());
    assert!(present(&report.checklist, "experience"));
    assert!(present(&report.checklist, "skills"));
    assert_eq!(report.analysis.overall_score, 7.0);
    assert_eq!(report.analysis.summary.as_deref(), Some("Solid backend profile"));

    let requests = service.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4o");
    assert_eq!(requests[0].messages[0].role, ChatRole::System);
    assert!(requests[0]
        .user_prompt()
        .unwrap()
        .contains("Python, AWS, 5 years experience"));
}

#[tokio::test]
async fn scenario_empty_document_reports_service_error() {
    let layer = StubPages::new(Vec::new());
    let service = StubService::text(r#"{"error": "empty document"}"#);
    let config = config(layer, service.clone());

    let screening = resume_analyzer::screen(pdf_document(), &config).await.unwrap();
    assert_eq!(screening.text, "");
    assert!(screening.checklist.iter().all(|r| !r.present));

    let err = analyze_document(pdf_document(), &config).await.unwrap_err();
    assert!(
        matches!(err, AnalyzerError::AnalysisService { ref message } if message == "empty document"),
        "got {err:?}"
    );
    assert_eq!(err.kind(), ErrorKind::AnalysisService);

    // The request still went out, with an empty document section.
    let requests = service.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_prompt().unwrap().contains("\"\"\"\n\n\"\"\""));
}

#[tokio::test]
async fn scenario_non_pdf_never_reaches_extraction() {
    let layer = StubPages::new(vec![vec!["Jane Doe"]]);
    let service = StubService::text(r#"{"overallScore": 9}"#);
    let document = Document::new(b"Jane Doe\n".to_vec(), "text/plain");

    let err = analyze_document(document, &config(layer.clone(), service.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::InvalidInputType { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::InvalidInputType);
    assert_eq!(layer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(service.request_count(), 0);
}

#[tokio::test]
async fn non_pdf_is_rejected_without_any_state() {
    let log = Arc::new(StateLog::default());
    let config = AnalyzerConfig::builder()
        .text_layer(StubPages::new(Vec::new()))
        .service(StubService::text("{}"))
        .observer(log.clone())
        .build()
        .unwrap();

    let err = Analyzer::new(config)
        .unwrap()
        .run(Document::new(Vec::new(), "image/png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInputType);
    assert!(log.0.lock().unwrap().is_empty());
}

// ── Properties ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn identical_input_gives_identical_reports() {
    let reply = r#"Here you go: {"overallScore": "8", "strengths": ["Clear", "Concise"], "performanceMetrics": {"formatting": 9}}"#;
    let analyzer = Analyzer::new(config(
        StubPages::new(vec![vec!["Jane", "Doe"], vec!["Education", "MIT"]]),
        StubService::message(reply, 1200, 300),
    ))
    .unwrap();

    let first = analyzer.run(pdf_document()).await.unwrap();
    let second = analyzer.run(pdf_document()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.usage.prompt_tokens, 1200);
    assert_eq!(first.usage.completion_tokens, 300);
}

#[tokio::test]
async fn each_run_starts_clean() {
    let log = Arc::new(StateLog::default());
    let config = AnalyzerConfig::builder()
        .text_layer(StubPages::new(vec![vec!["Skills:", "Rust"]]))
        .service(StubService::text(r#"{"overallScore": 6}"#))
        .observer(log.clone())
        .build()
        .unwrap();
    let analyzer = Analyzer::new(config).unwrap();

    analyzer.run(pdf_document()).await.unwrap();
    analyzer.run(pdf_document()).await.unwrap();

    let expected = [
        RunState::Idle,
        RunState::Extracting,
        RunState::ChecklistEvaluating,
        RunState::RequestingAnalysis,
        RunState::Validating,
        RunState::Complete,
    ];
    let states = log.0.lock().unwrap();
    assert_eq!(states.len(), expected.len() * 2);
    assert_eq!(&states[..expected.len()], &expected);
    assert_eq!(&states[expected.len()..], &expected);
}

#[tokio::test]
async fn extraction_failure_short_circuits() {
    let log = Arc::new(StateLog::default());
    let service = StubService::text(r#"{"overallScore": 6}"#);
    let config = AnalyzerConfig::builder()
        .text_layer(Arc::new(Corrupt))
        .service(service.clone())
        .observer(log.clone())
        .build()
        .unwrap();

    let err = Analyzer::new(config).unwrap().run(pdf_document()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
    assert_eq!(service.request_count(), 0);

    let states = log.0.lock().unwrap();
    assert_eq!(states[..2], [RunState::Idle, RunState::Extracting]);
    assert!(matches!(states.last(), Some(RunState::Failed(_))));
    assert_eq!(states.len(), 3);
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
    let service = StubService::failing("connection reset by peer");
    let err = analyze_document(
        pdf_document(),
        &config(StubPages::new(vec![vec!["Jane"]]), service.clone()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AnalyzerError::LlmApiError { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Environment);
    assert_eq!(service.request_count(), 1);
}

#[tokio::test]
async fn prose_only_reply_is_a_parse_error() {
    let err = analyze_document(
        pdf_document(),
        &config(
            StubPages::new(vec![vec!["Jane"]]),
            StubService::text("I'm sorry, I can't review this document."),
        ),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AnalyzerError::ResponseParse(ResponseParseError::MissingScore)
    ));
    assert!(err.to_string().contains("Invalid AI Response"));
}

#[tokio::test]
async fn broken_payload_is_a_decode_error() {
    let err = analyze_document(
        pdf_document(),
        &config(
            StubPages::new(vec![vec!["Jane"]]),
            StubService::text(r#"```json {"overallScore": 7, "strengths": ["a",] } ```"#),
        ),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn draft_then_final_reply_is_a_decode_error() {
    let err = analyze_document(
        pdf_document(),
        &config(
            StubPages::new(vec![vec!["Jane"]]),
            StubService::text(
                r#"Draft: {"overallScore": 8, "summary": } Final: {"overallScore": 3}"#,
            ),
        ),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, AnalyzerError::ResponseParse(ResponseParseError::Decode(_))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn first_of_two_payloads_is_reported() {
    let report = analyze_document(
        pdf_document(),
        &config(
            StubPages::new(vec![vec!["Jane"]]),
            StubService::text(r#"{"overallScore": 6} Revised: {"overallScore": 9}"#),
        ),
    )
    .await
    .unwrap();

    assert_eq!(report.analysis.overall_score, 6.0);
}

#[tokio::test]
async fn missing_optional_fields_stay_unavailable() {
    let report = analyze_document(
        pdf_document(),
        &config(
            StubPages::new(vec![vec!["Jane"]]),
            StubService::text(r#"{"overallScore": 4}"#),
        ),
    )
    .await
    .unwrap();

    let a = &report.analysis;
    assert_eq!(a.latest_qualification(), None);
    assert_eq!(a.domain_experience(), None);
    assert_eq!(a.top_strengths(), None);
    assert_eq!(a.pro_tips(), None);
    assert!(a.metric_readings().iter().all(|m| m.value.is_none()));
    assert_eq!(report.usage, TokenUsage::default());
}

#[test]
fn observer_and_services_are_send_sync() {
    fn assert_send_sync<T: Send + Sync + ?Sized>() {}
    assert_send_sync::<dyn RunObserver>();
    assert_send_sync::<dyn GenerationService>();
    assert_send_sync::<dyn TextLayer>();
    assert_send_sync::<Analyzer>();
}
