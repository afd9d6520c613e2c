//! Text Extractor — turns an uploaded PDF/DOCX into plain source text.
//!
//! Extraction is synchronous library work, so `DocumentTextExtractor` runs it on
//! the blocking pool. `SourceText` is the validated result the pipeline consumes.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

mod docx;
mod pdf;

/// Minimum number of non-whitespace-trimmed characters worth sending to a model.
pub const MIN_SOURCE_CHARS: usize = 50;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MSWORD_MIME: &str = "application/msword";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text: {0}")]
    Failed(String),

    #[error(
        "Could not extract sufficient text from the resume file ({chars} characters, need at least {MIN_SOURCE_CHARS})"
    )]
    InsufficientText { chars: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Resolves the document kind from the declared MIME type, falling back to the
    /// file extension when the browser sent a generic type.
    pub fn detect(mime_type: &str, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MIME => Ok(DocumentKind::Pdf),
            DOCX_MIME | MSWORD_MIME => Ok(DocumentKind::Docx),
            "text/plain" => Ok(DocumentKind::PlainText),
            "" | "application/octet-stream" => file_name
                .and_then(|name| name.rsplit_once('.'))
                .and_then(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
                    "pdf" => Some(DocumentKind::Pdf),
                    "docx" | "doc" => Some(DocumentKind::Docx),
                    "txt" => Some(DocumentKind::PlainText),
                    _ => None,
                })
                .ok_or_else(|| ExtractionError::UnsupportedFormat(mime_type.to_string())),
            _ => Err(ExtractionError::UnsupportedFormat(mime_type.to_string())),
        }
    }
}

/// Extracts plain text from a document already held in memory.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => pdf::extract(bytes),
        DocumentKind::Docx => docx::extract(bytes),
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractionError::Failed(format!("text file is not valid UTF-8: {e}"))),
    }
}

/// File-to-text capability consumed by the pipeline.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(
        &self,
        bytes: Bytes,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<String, ExtractionError>;
}

/// Default extractor: pdf-extract for PDFs, OOXML parsing for DOCX.
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(
        &self,
        bytes: Bytes,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let kind = DocumentKind::detect(mime_type, file_name)?;
        debug!("Extracting {:?} document ({} bytes)", kind, bytes.len());

        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
            .await
            .map_err(|e| ExtractionError::Failed(format!("extraction task failed: {e}")))??;

        info!("Extracted {} characters from {:?} document", text.len(), kind);
        Ok(text)
    }
}

/// Raw text extracted from one upload. Guaranteed to hold at least
/// `MIN_SOURCE_CHARS` characters once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    pub fn new(text: impl Into<String>) -> Result<Self, ExtractionError> {
        let text = text.into();
        let chars = text.trim().chars().count();
        if chars < MIN_SOURCE_CHARS {
            return Err(ExtractionError::InsufficientText { chars });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}
