//! Input resolution: turn a path or URL into an in-memory [`Document`].
//!
//! A `Document` is the uploaded blob plus the media type its source
//! *declared*: the file extension for local paths, the `Content-Type` header
//! for downloads. The pipeline gates on that declaration alone
//! ([`Document::ensure_pdf`]); whether the bytes really are a PDF is the
//! extractor's concern and fails as an extraction error.

use crate::error::AnalyzerError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The only media type the pipeline accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An uploaded document: opaque bytes plus a declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
    media_type: String,
    name: Option<String>,
}

impl Document {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            name: None,
        }
    }

    /// Attach a display name (file name or URL).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Reject anything whose declared media type is not PDF.
    pub fn ensure_pdf(&self) -> Result<(), AnalyzerError> {
        if is_pdf_media_type(&self.media_type) {
            Ok(())
        } else {
            Err(AnalyzerError::InvalidInputType {
                media_type: self.media_type.clone(),
            })
        }
    }
}

/// Compare the essence of a media type against `application/pdf`,
/// ignoring case and parameters such as `; charset=binary`.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
}

/// Media type implied by a file name's extension.
pub fn media_type_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("rtf") => "application/rtf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a [`Document`].
///
/// `media_type_override` replaces whatever the source declared.
pub async fn resolve_input(
    input: &str,
    media_type_override: Option<&str>,
    timeout_secs: u64,
) -> Result<Document, AnalyzerError> {
    if input.trim().is_empty() {
        return Err(AnalyzerError::InvalidInput {
            input: input.to_string(),
        });
    }
    let doc = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    Ok(match media_type_override {
        Some(mt) => Document {
            media_type: mt.to_string(),
            ..doc
        },
        None => doc,
    })
}

/// Read a local file into memory, declaring its type from the extension.
async fn read_local(path_str: &str) -> Result<Document, AnalyzerError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => AnalyzerError::PermissionDenied { path: path.clone() },
        _ => AnalyzerError::FileNotFound { path: path.clone() },
    })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path_str)
        .to_string();
    let media_type = media_type_for_name(&name);

    debug!("Read local file {} ({} bytes, {})", path.display(), bytes.len(), media_type);
    Ok(Document::new(bytes, media_type).with_name(name))
}

/// Download a URL into memory, declaring its type from `Content-Type`.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, AnalyzerError> {
    info!("Downloading resume from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AnalyzerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AnalyzerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = file_name_from_url(url);
    let media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| media_type_for_name(&name).to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({})", bytes.len(), media_type);
    Ok(Document::new(bytes.to_vec(), media_type).with_name(name))
}

/// Last path segment of the URL, or `downloaded.pdf`.
fn file_name_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/cv.pdf"));
        assert!(is_url("http://example.com/cv.pdf"));
        assert!(!is_url("/tmp/cv.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn pdf_media_type_ignores_case_and_parameters() {
        assert!(is_pdf_media_type("application/pdf"));
        assert!(is_pdf_media_type("Application/PDF"));
        assert!(is_pdf_media_type("application/pdf; charset=binary"));
        assert!(!is_pdf_media_type("application/x-pdf-ish"));
        assert!(!is_pdf_media_type("text/plain"));
        assert!(!is_pdf_media_type(""));
    }

    #[test]
    fn ensure_pdf_rejects_other_types() {
        let doc = Document::new(b"hello".to_vec(), "text/plain");
        let err = doc.ensure_pdf().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInputType { ref media_type } if media_type == "text/plain"));
        assert!(Document::new(Vec::new(), PDF_MEDIA_TYPE).ensure_pdf().is_ok());
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_name("cv.PDF"), PDF_MEDIA_TYPE);
        assert!(media_type_for_name("cv.docx").contains("wordprocessingml"));
        assert_eq!(media_type_for_name("cv"), "application/octet-stream");
    }

    #[test]
    fn url_file_name() {
        assert_eq!(file_name_from_url("https://x.io/a/jane.pdf?dl=1"), "jane.pdf");
        assert_eq!(file_name_from_url("https://x.io/download"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn resolves_local_file_with_declared_type() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.7").unwrap();
        let doc = resolve_input(tmp.path().to_str().unwrap(), None, 5).await.unwrap();
        assert_eq!(doc.media_type(), PDF_MEDIA_TYPE);
        assert_eq!(doc.bytes(), b"%PDF-1.7");
        assert!(doc.name().is_some_and(|n| n.ends_with(".pdf")));
    }

    #[tokio::test]
    async fn override_replaces_declared_type() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.7").unwrap();
        let doc = resolve_input(tmp.path().to_str().unwrap(), Some(PDF_MEDIA_TYPE), 5)
            .await
            .unwrap();
        assert!(doc.ensure_pdf().is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/here.pdf", None, 5).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound { .. }));
    }
}
