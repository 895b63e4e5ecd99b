//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-user upload status.

use crate::config::Config;
use doc_summarizer_core::ports::IdentityService;
use doc_summarizer_core::summarize::Summarizer;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityService>,
    pub summarizer: Summarizer,
    pub uploads: UploadTracker,
    pub config: Arc<Config>,
}

//=========================================================================================
// UploadStatus (What the Client Renders)
//=========================================================================================

/// The state of a user's most recent upload, in the shape the client displays it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadStatus {
    pub file_name: Option<String>,
    pub loading: bool,
    pub error_message: Option<String>,
    pub summary: Option<String>,
}

//=========================================================================================
// UploadTracker
//=========================================================================================

/// Tracks one upload status per user. A user may only have one upload in flight.
#[derive(Clone, Default)]
pub struct UploadTracker {
    inner: Arc<Mutex<HashMap<Uuid, UploadEntry>>>,
}

/// A status plus the generation of the upload allowed to write into it.
#[derive(Default)]
struct UploadEntry {
    status: UploadStatus,
    generation: u64,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, UploadEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks an upload as started, clearing the previous error and summary.
    /// Returns `None` while another upload by the same user is still running.
    pub fn begin(&self, user_id: Uuid, file_name: &str) -> Option<UploadGuard> {
        let mut entries = self.lock();
        let entry = entries.entry(user_id).or_default();
        if entry.status.loading {
            return None;
        }
        entry.generation += 1;
        entry.status = UploadStatus {
            file_name: Some(file_name.to_string()),
            loading: true,
            error_message: None,
            summary: None,
        };
        Some(UploadGuard {
            tracker: self.clone(),
            user_id,
            generation: entry.generation,
            settled: false,
        })
    }

    pub fn status(&self, user_id: Uuid) -> UploadStatus {
        self.lock()
            .get(&user_id)
            .map(|entry| entry.status.clone())
            .unwrap_or_default()
    }

    /// Forgets the user's uploads (used on sign-out). An upload still in
    /// flight keeps the user busy until it finishes, but its result is dropped.
    pub fn clear(&self, user_id: Uuid) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&user_id) else {
            return;
        };
        if entry.status.loading {
            entry.generation += 1;
            entry.status = UploadStatus {
                loading: true,
                ..UploadStatus::default()
            };
        } else {
            entries.remove(&user_id);
        }
    }

    fn settle(&self, user_id: Uuid, generation: u64, outcome: Option<Result<String, String>>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&user_id) else {
            return;
        };
        // Only one upload per user can be in flight, so any settle releases it.
        entry.status.loading = false;
        if entry.generation != generation {
            return;
        }
        match outcome {
            Some(Ok(summary)) => {
                entry.status.summary = Some(summary);
                entry.status.error_message = None;
            }
            Some(Err(message)) => {
                entry.status.summary = None;
                entry.status.error_message = Some(message);
            }
            None => {}
        }
    }
}

/// Held for the lifetime of one upload. Dropping it without settling (for
/// example when the client disconnects) still clears the loading flag.
pub struct UploadGuard {
    tracker: UploadTracker,
    user_id: Uuid,
    generation: u64,
    settled: bool,
}

impl UploadGuard {
    pub fn succeed(mut self, summary: &str) {
        self.settled = true;
        self.tracker
            .settle(self.user_id, self.generation, Some(Ok(summary.to_string())));
    }

    pub fn fail(mut self, message: &str) {
        self.settled = true;
        self.tracker
            .settle(self.user_id, self.generation, Some(Err(message.to_string())));
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.settle(self.user_id, self.generation, None);
        }
    }
}
