//! crates/doc_summarizer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the identity store, the parsing libraries and the remote
//! completion API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{DocumentKind, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Could not extract text: {0}")]
    Extraction(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The identity provider. The rest of the application only observes the
/// users and auth sessions it hands out.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the user owning a live auth session. Unknown or expired
    /// sessions yield `PortError::Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Converts the raw bytes of a document into plain text.
    async fn extract_text(&self, kind: DocumentKind, data: &[u8]) -> PortResult<String>;
}

/// The payload submitted to the remote completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub response_type: &'static str,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_type: "text",
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one prompt and returns the generated text unchanged.
    async fn complete(&self, request: &CompletionRequest) -> PortResult<String>;
}
