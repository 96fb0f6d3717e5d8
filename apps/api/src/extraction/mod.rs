//! Text extraction from stored resume artifacts.
//!
//! Extraction is a collaborator of the scoring path only: any failure here
//! degrades the evaluation to pending and never fails an intake.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("resume content unreadable: {0}")]
    Unreadable(String),

    #[error("no text extraction support for .{0} files")]
    Unsupported(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the plain text of the artifact at `location`.
    async fn extract_text(&self, location: &str) -> Result<String, ExtractionError>;
}

/// Extractor for the stored resume types: PDFs via `pdf-extract`, text files
/// via a plain read. DOCX content is accepted for storage but has no
/// extraction backend, so it scores as pending.
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract_text(&self, location: &str) -> Result<String, ExtractionError> {
        let ext = std::path::Path::new(location)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => {
                let path = location.to_string();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
                    .await
                    .map_err(|e| ExtractionError::Unreadable(e.to_string()))?
                    .map_err(|e| ExtractionError::Unreadable(e.to_string()))
            }
            "txt" => tokio::fs::read_to_string(location)
                .await
                .map_err(|e| ExtractionError::Unreadable(e.to_string())),
            other => Err(ExtractionError::Unsupported(other.to_string())),
        }
    }
}
