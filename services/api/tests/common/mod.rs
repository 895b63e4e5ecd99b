//! Shared fixtures for the router-level tests: an in-memory identity provider,
//! a scripted completion endpoint and multipart/zip builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use api_lib::config::Config;
use api_lib::web::{self, state::{AppState, UploadTracker}};
use api_lib::adapters::LibraryExtractor;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use doc_summarizer_core::domain::{User, UserCredentials};
use doc_summarizer_core::ports::{
    CompletionRequest, CompletionService, IdentityService, PortError, PortResult,
};
use doc_summarizer_core::summarize::Summarizer;
use tokio::sync::Notify;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const BOUNDARY: &str = "summarizer-test-boundary";

//=========================================================================================
// In-memory identity provider
//=========================================================================================

#[derive(Default)]
pub struct InMemoryIdentity {
    users: Mutex<HashMap<String, UserCredentials>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl InMemoryIdentity {
    /// Registers a user and a live session, returning `(user, cookie header value)`.
    pub fn seed_session(&self, email: &str) -> (User, String) {
        let user_id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            email.to_string(),
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: String::new(),
            },
        );
        let session_id = Uuid::new_v4().to_string();
        self.sessions.lock().unwrap().insert(
            session_id.clone(),
            (user_id, Utc::now() + chrono::Duration::hours(1)),
        );
        let user = User {
            user_id,
            email: Some(email.to_string()),
        };
        (user, format!("session={}", session_id))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(PortError::Conflict(email.to_string()));
        }
        let user_id = Uuid::new_v4();
        users.insert(
            email.to_string(),
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let (user_id, expires_at) = *self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .ok_or(PortError::Unauthorized)?;
        if expires_at <= Utc::now() {
            return Err(PortError::Unauthorized);
        }
        let email = self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| c.email.clone());
        Ok(User { user_id, email })
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// Scripted completion endpoint
//=========================================================================================

pub struct ScriptedCompletion {
    reply: PortResult<String>,
    pub prompts: Mutex<Vec<CompletionRequest>>,
    /// When set, every call waits for one notification before replying.
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(PortError::Unexpected("upstream timeout".to_string())),
            prompts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn held_by(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> PortResult<String> {
        self.prompts.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

//=========================================================================================
// App harness
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub identity: Arc<InMemoryIdentity>,
    pub completion: Arc<ScriptedCompletion>,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://unused/summarizer"),
        ("OPENAI_API_KEY", "sk-test"),
        ("SESSION_TTL_DAYS", "1"),
        ("MAX_UPLOAD_BYTES", "1048576"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

pub fn test_app(completion: ScriptedCompletion) -> TestApp {
    let identity = Arc::new(InMemoryIdentity::default());
    let completion = Arc::new(completion);
    let state = Arc::new(AppState {
        identity: identity.clone(),
        summarizer: Summarizer::new(Arc::new(LibraryExtractor::new()), completion.clone()),
        uploads: UploadTracker::new(),
        config: Arc::new(test_config()),
    });
    TestApp {
        router: web::router(state.clone()),
        state,
        identity,
        completion,
    }
}

//=========================================================================================
// Request builders
//=========================================================================================

pub fn upload_request(cookie: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/summaries")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_post(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` part of a `Set-Cookie` response header.
pub fn cookie_from(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

//=========================================================================================
// Document fixtures
//=========================================================================================

/// A minimal `.docx` whose body holds one run per entry in `runs`.
pub fn docx_with_runs(runs: &[&str]) -> Vec<u8> {
    let body: String = runs
        .iter()
        .map(|r| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", r))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// A minimal `.pptx` with one text run per slide.
pub fn pptx_with_slides(slides: &[&str]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (index, text) in slides.iter().enumerate() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            text
        );
        writer
            .start_file(format!("ppt/slides/slide{}.xml", index + 1), FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
