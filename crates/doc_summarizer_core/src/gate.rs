//! crates/doc_summarizer_core/src/gate.rs
//!
//! Decides whether a client shows the sign-in screen or the summarizer tool.
//! The gate only observes identity; the session lifecycle itself belongs to
//! the identity provider.

use serde::Serialize;

use crate::domain::User;
use crate::ports::PortResult;

/// The screen a client must render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateView {
    SignIn,
    Tool,
}

/// An auth-state change notification from the identity provider.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

#[derive(Debug, Clone)]
pub struct SessionGate {
    user: Option<User>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        Self { user: None }
    }

    /// Seeds the gate from the initial identity lookup. A failed lookup is
    /// the same as no session.
    pub fn restore(&mut self, lookup: PortResult<User>) -> GateView {
        self.user = lookup.ok();
        self.view()
    }

    pub fn apply(&mut self, event: AuthEvent) -> GateView {
        match event {
            AuthEvent::SignedIn(user) => self.user = Some(user),
            AuthEvent::SignedOut => self.user = None,
        }
        self.view()
    }

    pub fn sign_out(&mut self) -> GateView {
        self.apply(AuthEvent::SignedOut)
    }

    pub fn view(&self) -> GateView {
        if self.user.is_some() {
            GateView::Tool
        } else {
            GateView::SignIn
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
