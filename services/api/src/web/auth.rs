//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login and logout, plus the session gate
//! that tells the client whether to show the sign-in screen or the tool.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use doc_summarizer_core::{
    domain::User,
    gate::{AuthEvent, GateView, SessionGate},
    ports::PortError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    middleware::{session_id_from_headers, SESSION_COOKIE},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<&User> for AuthResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
        }
    }
}

/// Which screen the client shows, and for whom.
#[derive(Debug, Serialize, ToSchema)]
pub struct GateResponse {
    /// Either `sign_in` or `tool`.
    #[schema(value_type = String)]
    pub view: GateView,
    pub user: Option<AuthResponse>,
}

impl From<&SessionGate> for GateResponse {
    fn from(gate: &SessionGate) -> Self {
        Self {
            view: gate.view(),
            user: gate.user().map(AuthResponse::from),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Creates an auth session for `user_id` and returns the `Set-Cookie` value.
async fn issue_session(state: &AppState, user_id: Uuid) -> Result<String, (StatusCode, String)> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    state
        .identity
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    Ok(format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        auth_session_id,
        ttl.num_seconds()
    ))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), (StatusCode, String)> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "A valid email is required".to_string()));
    }
    if password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A password is required".to_string()));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/session - Report whether the client should show sign-in or the tool
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current gate view", body = GateResponse)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<GateResponse> {
    let lookup = match session_id_from_headers(&headers) {
        Some(auth_session_id) => state.identity.validate_auth_session(auth_session_id).await,
        None => Err(PortError::Unauthorized),
    };

    let mut gate = SessionGate::new();
    gate.restore(lookup);
    Json(GateResponse::from(&gate))
}

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = GateResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_credentials(&req.email, &req.password)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user with the identity provider
    let user = state
        .identity
        .create_user_with_email(&req.email, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => (
                StatusCode::CONFLICT,
                "An account with this email already exists".to_string(),
            ),
            other => {
                error!("Failed to create user: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
            }
        })?;

    // 3. Start the browser session
    let cookie = issue_session(&state, user.user_id).await?;
    info!(user_id = %user.user_id, "User signed up");

    let mut gate = SessionGate::new();
    gate.apply(AuthEvent::SignedIn(user));

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(GateResponse::from(&gate)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = GateResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Get user by email
    let user_creds = state
        .identity
        .get_user_by_email(&req.email)
        .await
        .map_err(|e| {
            error!("Failed to get user: {:?}", e);
            (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()));
    }

    // 3. Start the browser session
    let cookie = issue_session(&state, user_creds.user_id).await?;
    info!(user_id = %user_creds.user_id, "User logged in");

    let mut gate = SessionGate::new();
    gate.apply(AuthEvent::SignedIn(User {
        user_id: user_creds.user_id,
        email: Some(user_creds.email),
    }));

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(GateResponse::from(&gate)),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = GateResponse),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Extract session cookie
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 2. Forget the user's upload state if the session is still live
    let mut gate = SessionGate::new();
    if let Ok(user) = state.identity.validate_auth_session(auth_session_id).await {
        state.uploads.clear(user.user_id);
        info!(user_id = %user.user_id, "User signed out");
        gate.apply(AuthEvent::SignedIn(user));
    }

    // 3. Delete auth session
    state
        .identity
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;

    // 4. Clear cookie
    gate.sign_out();
    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(GateResponse::from(&gate)),
    ))
}
