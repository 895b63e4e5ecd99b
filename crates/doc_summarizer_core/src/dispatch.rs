//! crates/doc_summarizer_core/src/dispatch.rs
//!
//! Maps a file name to the extraction path that handles it.

use crate::domain::DocumentKind;

/// Every extension the service accepts, in the order the file picker lists them.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// Value for an HTML `accept` attribute restricting the file picker.
pub const ACCEPT_ATTRIBUTE: &str = ".pdf,.doc,.docx,.xls,.xlsx,.ppt,.pptx";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported file type: {extension}")]
pub struct UnsupportedFileType {
    pub extension: String,
}

/// Returns the lower-cased text after the last `.`. A name without any `.`
/// is its own extension.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" | "ppt" | "pptx" => Some(Self::WordProcessing),
            "xls" | "xlsx" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Selects the extraction path for `file_name`.
    pub fn from_file_name(file_name: &str) -> Result<Self, UnsupportedFileType> {
        let extension = file_extension(file_name);
        Self::from_extension(&extension).ok_or(UnsupportedFileType { extension })
    }
}
