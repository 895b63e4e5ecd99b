pub mod db;
pub mod extractor;
pub mod http_completion;
pub mod office_text;
pub mod openai_completion;
pub mod pdf_text;
pub mod sheet_text;

pub use db::DbAdapter;
pub use extractor::LibraryExtractor;
pub use http_completion::HttpCompletionAdapter;
pub use openai_completion::OpenAiCompletionAdapter;
