//! crates/doc_summarizer_core/src/summarize.rs
//!
//! The upload-extract-summarize pipeline: dispatch on the file name, extract the
//! text, truncate it, wrap it in the prompt template and forward it to the
//! completion endpoint.

use std::sync::Arc;

use tracing::{debug, info};

use crate::dispatch::UnsupportedFileType;
use crate::domain::{DocumentKind, Summary, UploadedFile};
use crate::ports::{CompletionRequest, CompletionService, PortError, TextExtractionService};

/// Extracted text is cut to this many characters before it is sent onward.
pub const TRUNCATION_BOUND: usize = 5000;

const PROMPT_PREFIX: &str =
    "Please provide an accurate summary of the following document in less than 100 words:\n\n";

pub const UNSUPPORTED_FILE_TYPE_MESSAGE: &str = "Unsupported file type.";
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing the document.";

//=========================================================================================
// Pipeline Error
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error(transparent)]
    UnsupportedFileType(#[from] UnsupportedFileType),
    #[error("Text extraction failed: {0}")]
    Extraction(#[source] PortError),
    #[error("Could not extract text from the document.")]
    EmptyExtraction,
    #[error("Completion request failed: {0}")]
    Completion(#[source] PortError),
}

impl SummaryError {
    /// The only text a client ever sees for this error. Everything except an
    /// unsupported type collapses to the same generic message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) => UNSUPPORTED_FILE_TYPE_MESSAGE,
            Self::Extraction(_) | Self::EmptyExtraction | Self::Completion(_) => {
                PROCESSING_ERROR_MESSAGE
            }
        }
    }
}

//=========================================================================================
// Text Helpers
//=========================================================================================

/// Keeps the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Embeds document text in the fixed summarization instruction.
pub fn build_prompt(document_text: &str) -> String {
    format!("{PROMPT_PREFIX}{document_text}")
}

//=========================================================================================
// Summarizer
//=========================================================================================

/// Runs one file through extraction and the remote completion call.
#[derive(Clone)]
pub struct Summarizer {
    extractor: Arc<dyn TextExtractionService>,
    completion: Arc<dyn CompletionService>,
}

impl Summarizer {
    pub fn new(
        extractor: Arc<dyn TextExtractionService>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            extractor,
            completion,
        }
    }

    pub async fn summarize(&self, file: &UploadedFile) -> Result<Summary, SummaryError> {
        let kind = DocumentKind::from_file_name(&file.file_name)?;
        debug!(file_name = %file.file_name, ?kind, "Dispatching document for extraction");

        let extracted = self
            .extractor
            .extract_text(kind, &file.data)
            .await
            .map_err(SummaryError::Extraction)?;

        if extracted.is_empty() {
            return Err(SummaryError::EmptyExtraction);
        }

        let text = truncate_chars(&extracted, TRUNCATION_BOUND);
        info!(
            file_name = %file.file_name,
            extracted_chars = extracted.chars().count(),
            "Requesting summary"
        );

        let request = CompletionRequest::text(build_prompt(text));
        let summary = self
            .completion
            .complete(&request)
            .await
            .map_err(SummaryError::Completion)?;

        Ok(Summary(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeExtractor {
        result: Mutex<Option<PortResult<String>>>,
        calls: AtomicUsize,
    }

    impl FakeExtractor {
        fn returning(result: PortResult<String>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextExtractionService for FakeExtractor {
        async fn extract_text(&self, _kind: DocumentKind, _data: &[u8]) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("extractor called more than once")
        }
    }

    #[derive(Default)]
    struct RecordingCompletion {
        requests: Mutex<Vec<CompletionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionService for RecordingCompletion {
        async fn complete(&self, request: &CompletionRequest) -> PortResult<String> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(PortError::Unexpected("upstream 502".to_string()));
            }
            Ok("  A short summary.\n".to_string())
        }
    }

    fn summarizer(
        extractor: Arc<FakeExtractor>,
        completion: Arc<RecordingCompletion>,
    ) -> Summarizer {
        Summarizer::new(extractor, completion)
    }

    #[test]
    fn truncate_keeps_exactly_the_bound() {
        let long = "x".repeat(TRUNCATION_BOUND + 250);
        assert_eq!(truncate_chars(&long, TRUNCATION_BOUND).len(), TRUNCATION_BOUND);

        let short = "Alpha Beta Gamma";
        assert_eq!(truncate_chars(short, TRUNCATION_BOUND), short);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut, "éééé");
    }

    #[test]
    fn prompt_embeds_text_after_instruction() {
        let prompt = build_prompt("Alpha Beta Gamma");
        assert_eq!(
            prompt,
            "Please provide an accurate summary of the following document in less than 100 words:\n\nAlpha Beta Gamma"
        );
    }

    #[tokio::test]
    async fn forwards_short_text_verbatim_and_returns_summary_unchanged() {
        let extractor = FakeExtractor::returning(Ok("Alpha Beta Gamma".to_string()));
        let completion = Arc::new(RecordingCompletion::default());
        let summary = summarizer(extractor, completion.clone())
            .summarize(&UploadedFile::new("report.pdf", &b"%PDF"[..]))
            .await
            .unwrap();

        assert_eq!(summary.as_str(), "  A short summary.\n");
        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.ends_with("\n\nAlpha Beta Gamma"));
        assert_eq!(requests[0].response_type, "text");
    }

    #[tokio::test]
    async fn long_text_is_cut_before_sending() {
        let text = format!("{}{}", "a".repeat(TRUNCATION_BOUND), "TAIL");
        let extractor = FakeExtractor::returning(Ok(text));
        let completion = Arc::new(RecordingCompletion::default());
        summarizer(extractor, completion.clone())
            .summarize(&UploadedFile::new("notes.docx", &b"PK"[..]))
            .await
            .unwrap();

        let requests = completion.requests.lock().unwrap();
        let sent = requests[0].prompt.strip_prefix(PROMPT_PREFIX).unwrap();
        assert_eq!(sent.chars().count(), TRUNCATION_BOUND);
        assert!(!sent.contains("TAIL"));
    }

    #[tokio::test]
    async fn unsupported_type_skips_extraction_and_network() {
        let extractor = FakeExtractor::returning(Ok("unused".to_string()));
        let completion = Arc::new(RecordingCompletion::default());
        let err = summarizer(extractor.clone(), completion.clone())
            .summarize(&UploadedFile::new("image.png", &b"\x89PNG"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, SummaryError::UnsupportedFileType(_)));
        assert_eq!(err.user_message(), "Unsupported file type.");
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert!(completion.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_hides_cause() {
        let extractor =
            FakeExtractor::returning(Err(PortError::Extraction("bad xref table".to_string())));
        let completion = Arc::new(RecordingCompletion::default());
        let err = summarizer(extractor, completion.clone())
            .summarize(&UploadedFile::new("broken.pdf", &b"garbage"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, SummaryError::Extraction(_)));
        assert_eq!(err.user_message(), PROCESSING_ERROR_MESSAGE);
        assert!(!err.user_message().contains("xref"));
        assert!(completion.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_extraction_matches_extraction_failure() {
        let extractor = FakeExtractor::returning(Ok(String::new()));
        let completion = Arc::new(RecordingCompletion::default());
        let err = summarizer(extractor, completion.clone())
            .summarize(&UploadedFile::new("blank.xlsx", &b"PK"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, SummaryError::EmptyExtraction));
        assert_eq!(err.user_message(), PROCESSING_ERROR_MESSAGE);
        assert!(completion.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_text_is_still_sent() {
        let extractor = FakeExtractor::returning(Ok(" \n ".to_string()));
        let completion = Arc::new(RecordingCompletion::default());
        summarizer(extractor, completion.clone())
            .summarize(&UploadedFile::new("blank.pdf", &b"%PDF"[..]))
            .await
            .unwrap();

        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.ends_with(" \n "));
    }

    #[tokio::test]
    async fn completion_failure_uses_generic_message() {
        let extractor = FakeExtractor::returning(Ok("Some text".to_string()));
        let completion = Arc::new(RecordingCompletion {
            fail: true,
            ..Default::default()
        });
        let err = summarizer(extractor, completion)
            .summarize(&UploadedFile::new("deck.pptx", &b"PK"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, SummaryError::Completion(_)));
        assert_eq!(err.user_message(), PROCESSING_ERROR_MESSAGE);
    }
}
