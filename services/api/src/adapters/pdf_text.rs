//! services/api/src/adapters/pdf_text.rs
//!
//! PDF text extraction, backed by `pdf-extract`.

use doc_summarizer_core::ports::{PortError, PortResult};

/// Returns the text of every page, in page order.
pub fn extract_pdf_text(data: &[u8]) -> PortResult<String> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| PortError::Extraction(format!("PDF could not be read: {}", e)))
}
