//! CLI binary for resume-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalyzerConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_analyzer::analyze::write_atomic;
use resume_analyzer::{
    resolve_input, screen, AnalysisResult, Analyzer, AnalyzerConfig, ChecklistResult,
    PipelineReport, RunObserver, RunState, Screening,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const NOT_AVAILABLE: &str = "not available";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI run observer using indicatif ─────────────────────────────────────────

/// Spinner on stderr that follows the run's state transitions.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Analyzing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl RunObserver for CliObserver {
    fn on_state(&self, state: &RunState) {
        match state {
            RunState::Complete | RunState::Failed(_) => self.bar.finish_and_clear(),
            other => self.bar.set_message(other.to_string()),
        }
    }

    fn on_text_extracted(&self, page_count: usize, chars: usize) {
        self.bar.println(format!(
            "  {} Extracted {}  {}",
            green("✓"),
            bold(&format!("{page_count} pages")),
            dim(&format!("{chars} chars")),
        ));
    }

    fn on_reply_received(&self, reply_len: usize) {
        self.bar.println(format!(
            "  {} Model replied  {}",
            green("✓"),
            dim(&format!("{reply_len} chars")),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a resume (terminal report)
  resume-analyzer resume.pdf

  # JSON report to a file
  resume-analyzer resume.pdf --json -o report.json

  # Use a specific model
  resume-analyzer --model gpt-4o-mini --provider openai resume.pdf

  # Analyze from URL
  resume-analyzer https://example.com/jane-doe.pdf

  # Checklist only (no API key needed)
  resume-analyzer --checklist-only resume.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY             OpenAI API key
  ANTHROPIC_API_KEY          Anthropic API key
  GEMINI_API_KEY             Google Gemini API key
  RESUME_ANALYZER_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  RESUME_ANALYZER_MODEL      Override model ID (default gpt-4o)
  PDFIUM_LIB_PATH            Path to an existing libpdfium

SETUP:
  1. Install libpdfium or set PDFIUM_LIB_PATH
  2. Set API key:     export OPENAI_API_KEY=sk-...
  3. Analyze:         resume-analyzer resume.pdf
"#;

/// Score PDF resumes with ATS-style checks and an LLM review.
#[derive(Parser, Debug)]
#[command(
    name = "resume-analyzer",
    version,
    about = "Score PDF resumes with ATS-style checks and an LLM review",
    long_about = "Extract the text of a PDF resume (local file or URL), run a fixed set of \
presence checks against it, and ask a language model for a scored review. Supports OpenAI, \
Anthropic, Google Gemini and any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, env = "RESUME_ANALYZER_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4o, gpt-4o-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "RESUME_ANALYZER_MODEL", default_value = resume_analyzer::prompts::DEFAULT_MODEL)]
    model: String,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "RESUME_ANALYZER_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Treat the input as this media type instead of the one its source declares.
    #[arg(long, env = "RESUME_ANALYZER_MEDIA_TYPE")]
    media_type: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "RESUME_ANALYZER_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max LLM output tokens.
    #[arg(long, env = "RESUME_ANALYZER_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Output the report as JSON instead of the terminal layout.
    #[arg(long, env = "RESUME_ANALYZER_JSON")]
    json: bool,

    /// Extract text and run the checklist only; no model call.
    #[arg(long)]
    checklist_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RESUME_ANALYZER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME_ANALYZER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME_ANALYZER_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "RESUME_ANALYZER_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the progress; library INFO logs would tear it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli, show_progress && !cli.checklist_only)?;

    let document = resolve_input(&cli.input, cli.media_type.as_deref(), cli.download_timeout)
        .await
        .context("Failed to load resume")?;

    // ── Checklist-only mode ──────────────────────────────────────────────
    if cli.checklist_only {
        let screening = screen(document, &config)
            .await
            .context("Failed to screen resume")?;
        let rendered = if cli.json {
            serde_json::to_string_pretty(&screening).context("Failed to serialise screening")?
        } else {
            render_screening(&screening)
        };
        return emit(&cli, &rendered).await;
    }

    // ── Full analysis ────────────────────────────────────────────────────
    let analyzer = Analyzer::new(config).context("Analysis service is not ready")?;
    let report = analyzer.run(document).await.context("Analysis failed")?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&report).context("Failed to serialise report")?
    } else {
        render_report(&report)
    };
    emit(&cli, &rendered).await?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&report.usage.prompt_tokens.to_string()),
            dim(&report.usage.completion_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `AnalyzerConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .model(cli.model.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if show_progress {
        builder = builder.observer(CliObserver::new() as Arc<dyn RunObserver>);
    }

    builder.build().context("Invalid configuration")
}

/// Print to stdout, or write atomically to `--output`.
async fn emit(cli: &Cli, rendered: &str) -> Result<()> {
    match cli.output {
        Some(ref path) => {
            let mut contents = rendered.to_string();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            write_atomic(path, contents.as_bytes())
                .await
                .context("Failed to write report")?;
            if !cli.quiet {
                eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

// ── Terminal rendering ───────────────────────────────────────────────────────

fn render_checklist(out: &mut String, checklist: &[ChecklistResult]) {
    out.push_str(&bold("ATS checklist"));
    out.push('\n');
    for rule in checklist {
        let mark = if rule.present { green("✓") } else { red("✗") };
        out.push_str(&format!("  {mark} {}\n", rule.label));
    }
}

fn render_screening(screening: &Screening) -> String {
    let mut out = format!(
        "{} {}\n\n",
        cyan("◆"),
        bold(&format!("{} pages, {} chars", screening.page_count, screening.text.chars().count()))
    );
    render_checklist(&mut out, &screening.checklist);
    out
}

fn or_na(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_else(|| dim(NOT_AVAILABLE))
}

fn render_list(out: &mut String, title: &str, items: Option<&[String]>) {
    out.push_str(&bold(title));
    out.push('\n');
    match items {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("  {}. {item}\n", i + 1));
            }
        }
        None => out.push_str(&format!("  {}\n", dim(NOT_AVAILABLE))),
    }
    out.push('\n');
}

fn render_analysis(out: &mut String, a: &AnalysisResult) {
    let band = a.score_band();
    let score = format!("{}/10  {}", a.overall_score, band.label());
    let score = match band {
        resume_analyzer::ScoreBand::Excellent => green(&score),
        resume_analyzer::ScoreBand::Good => yellow(&score),
        resume_analyzer::ScoreBand::NeedsImprovement => red(&score),
    };
    out.push_str(&format!("{} {}\n\n", bold("Overall score:"), score));

    out.push_str(&format!("  Latest qualification:    {}\n", or_na(a.latest_qualification())));
    out.push_str(&format!("  Earliest qualification:  {}\n", or_na(a.earliest_qualification())));
    out.push_str(&format!("  Total experience:        {}\n", or_na(a.total_experience())));
    out.push_str(&format!("  Domain experience:       {}\n\n", or_na(a.domain_experience())));

    out.push_str(&bold("Summary"));
    out.push('\n');
    out.push_str(&format!("  {}\n\n", or_na(a.summary.as_deref())));

    out.push_str(&bold("Performance metrics"));
    out.push('\n');
    for m in a.metric_readings() {
        let value = match m.value {
            Some(v) => format!("{v:>4.1}/10"),
            None => dim(NOT_AVAILABLE),
        };
        out.push_str(&format!("  {:<28}{value}\n", m.label));
    }
    out.push('\n');

    render_list(out, "Top strengths", a.top_strengths());
    render_list(out, "Areas to improve", a.top_improvements());
    render_list(out, "Action items", a.action_items());
    render_list(out, "Pro tips", a.pro_tips());

    out.push_str(&bold("Recommended keywords"));
    out.push('\n');
    match a.recommended_keywords() {
        Some(k) => out.push_str(&format!("  {}\n", k.join(", "))),
        None => out.push_str(&format!("  {}\n", dim(NOT_AVAILABLE))),
    }
}

fn render_report(report: &PipelineReport) -> String {
    let mut out = format!(
        "{} {}\n\n",
        cyan("◆"),
        bold(&format!("{} pages, {} chars", report.page_count, report.text.chars().count()))
    );
    render_analysis(&mut out, &report.analysis);
    out.push('\n');
    render_checklist(&mut out, &report.checklist);
    out
}
