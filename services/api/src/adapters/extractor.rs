//! services/api/src/adapters/extractor.rs
//!
//! This module contains the adapter that implements the `TextExtractionService`
//! port by handing each document kind to its parsing library.

use async_trait::async_trait;
use doc_summarizer_core::domain::DocumentKind;
use doc_summarizer_core::ports::{PortError, PortResult, TextExtractionService};
use tracing::debug;

use super::{office_text::extract_office_text, pdf_text::extract_pdf_text, sheet_text::extract_sheet_text};

/// Runs the parsing libraries on the blocking thread pool.
#[derive(Clone, Default)]
pub struct LibraryExtractor;

impl LibraryExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractionService for LibraryExtractor {
    async fn extract_text(&self, kind: DocumentKind, data: &[u8]) -> PortResult<String> {
        let data = data.to_vec();
        let size = data.len();

        let text = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => extract_pdf_text(&data),
            DocumentKind::WordProcessing => extract_office_text(&data),
            DocumentKind::Spreadsheet => extract_sheet_text(&data),
        })
        .await
        // A panic inside a parser surfaces as a join error.
        .map_err(|e| PortError::Extraction(format!("Parser aborted: {}", e)))??;

        debug!(?kind, bytes = size, chars = text.chars().count(), "Extracted document text");
        Ok(text)
    }
}
