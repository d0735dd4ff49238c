//! Text extraction: PDF bytes → one plain-text string.
//!
//! The PDF parser is a collaborator behind [`TextLayer`]: it opens the bytes
//! and reports each page's text fragments. [`extract_text`] owns the joining
//! rule (fragments by a single space, pages by a newline, whole result
//! trimmed) and the ordering guarantee, so a backend may hand pages back in
//! any order without changing the output.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and CPU-bound parsing.
//! Running it on the blocking pool keeps the async workers free while the
//! document is decoded.

use crate::error::AnalyzerError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Text fragments of one page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 0-based page index.
    pub index: usize,
    pub fragments: Vec<String>,
}

/// Result of the extraction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// A PDF parser that can report per-page text fragments.
///
/// Implementations are called from a blocking thread. Pages may be returned
/// in any order; each index must appear once.
pub trait TextLayer: Send + Sync {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, AnalyzerError>;
}

/// Extract the document text through `layer`.
pub async fn extract_text(
    layer: Arc<dyn TextLayer>,
    bytes: Vec<u8>,
) -> Result<ExtractedText, AnalyzerError> {
    let pages = tokio::task::spawn_blocking(move || layer.read_pages(&bytes))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Extraction task panicked: {}", e)))??;

    let page_count = pages.len();
    let text = join_pages(pages);
    if page_count == 0 {
        warn!("Document has no pages; continuing with empty text");
    }
    info!("Extracted {} chars from {} pages", text.len(), page_count);

    Ok(ExtractedText { text, page_count })
}

/// Join pages in index order: fragments by `" "`, pages by `"\n"`, then trim.
pub fn join_pages(mut pages: Vec<PageText>) -> String {
    pages.sort_by_key(|p| p.index);
    pages
        .iter()
        .map(|p| p.fragments.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ── pdfium backend ───────────────────────────────────────────────────────

/// [`TextLayer`] backed by the pdfium shared library.
///
/// Library discovery order:
/// 1. the explicit path given to [`PdfiumTextLayer::new`]
/// 2. `PDFIUM_LIB_PATH`
/// 3. the system library search path
///
/// A fresh `Pdfium` binding is made per document; the OS caches the
/// `dlopen`, so repeat binds are cheap.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextLayer {
    lib_path: Option<PathBuf>,
}

impl PdfiumTextLayer {
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }

    fn bind(&self) -> Result<Pdfium, AnalyzerError> {
        let explicit = self
            .lib_path
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path).map_err(|e| {
                    AnalyzerError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
                })?
            }
            None => Pdfium::bind_to_system_library()
                .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{:?}", e)))?,
        };
        Ok(Pdfium::new(bindings))
    }
}

impl TextLayer for PdfiumTextLayer {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, AnalyzerError> {
        if !has_pdf_header(bytes) {
            return Err(AnalyzerError::Extraction {
                detail: "missing %PDF header".to_string(),
            });
        }

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();
        debug!("PDF loaded: {} pages", pages.len());

        let mut out = Vec::with_capacity(pages.len() as usize);
        for (index, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| AnalyzerError::Extraction {
                detail: format!("page {}: {:?}", index + 1, e),
            })?;
            let fragments: Vec<String> = text.segments().iter().map(|s| s.text()).collect();
            out.push(PageText { index, fragments });
        }
        Ok(out)
    }
}

/// PDF files may carry junk before the header; readers accept it within the first KiB.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(4).any(|w| w == b"%PDF")
}

fn map_load_error(e: PdfiumError) -> AnalyzerError {
    let msg = format!("{:?}", e);
    let detail = if msg.to_lowercase().contains("password") {
        "document is password-protected".to_string()
    } else {
        format!("unreadable document ({})", msg)
    };
    AnalyzerError::Extraction { detail }
}
