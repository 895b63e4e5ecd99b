pub mod dispatch;
pub mod domain;
pub mod gate;
pub mod ports;
pub mod summarize;

pub use dispatch::{ACCEPT_ATTRIBUTE, SUPPORTED_EXTENSIONS, UnsupportedFileType};
pub use domain::{AuthSession, DocumentKind, Summary, UploadedFile, User, UserCredentials};
pub use gate::{AuthEvent, GateView, SessionGate};
pub use ports::{CompletionRequest, CompletionService, IdentityService, PortError, PortResult,
    TextExtractionService};
pub use summarize::{Summarizer, SummaryError, TRUNCATION_BOUND};
