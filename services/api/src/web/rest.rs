//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the summarization endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth::{AuthResponse, GateResponse, LoginRequest, SignupRequest},
    state::{AppState, UploadStatus},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use doc_summarizer_core::{
    dispatch::{ACCEPT_ATTRIBUTE, SUPPORTED_EXTENSIONS},
    domain::{UploadedFile, User},
    summarize::SummaryError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_summary_handler,
        current_summary_handler,
        formats_handler,
        crate::web::auth::session_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
    ),
    components(
        schemas(
            SummaryResponse,
            ErrorResponse,
            FormatsResponse,
            UploadStatus,
            GateResponse,
            AuthResponse,
            SignupRequest,
            LoginRequest,
        )
    ),
    tags(
        (name = "Document Summarizer API", description = "Upload an office document and receive a short summary.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after a document was summarized.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub file_name: String,
    pub summary: String,
}

/// Error body for a rejected upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// The file types a client should offer in its file picker.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormatsResponse {
    pub extensions: Vec<String>,
    /// Ready-made value for an HTML `accept` attribute.
    pub accept: String,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(status: StatusCode, message: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Reads the first file part of the form.
async fn read_uploaded_file(multipart: &mut Multipart) -> Result<UploadedFile, ErrorReply> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_reply(e.status(), e.body_text()))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| error_reply(e.status(), e.body_text()))?;
        return Ok(UploadedFile::new(file_name, data));
    }

    Err(error_reply(
        StatusCode::BAD_REQUEST,
        "Multipart form must include a file",
    ))
}

/// Summarize an uploaded document.
///
/// Accepts a multipart/form-data request with a single file part. The text is
/// extracted, cut to its first 5000 characters and sent to the completion
/// endpoint; the summary is returned unchanged.
#[utoipa::path(
    post,
    path = "/summaries",
    request_body(content_type = "multipart/form-data", description = "The document to summarize."),
    responses(
        (status = 200, description = "Document summarized", body = SummaryResponse),
        (status = 400, description = "No file in the request", body = ErrorResponse),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Another upload is still being processed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 422, description = "The document could not be processed", body = ErrorResponse)
    )
)]
pub async fn create_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<SummaryResponse>, ErrorReply> {
    let file = read_uploaded_file(&mut multipart).await?;

    let guard = app_state
        .uploads
        .begin(user.user_id, &file.file_name)
        .ok_or_else(|| {
            error_reply(
                StatusCode::CONFLICT,
                "A document is already being processed.",
            )
        })?;

    info!(user_id = %user.user_id, file_name = %file.file_name, bytes = file.data.len(), "Processing upload");

    match app_state.summarizer.summarize(&file).await {
        Ok(summary) => {
            guard.succeed(summary.as_str());
            Ok(Json(SummaryResponse {
                file_name: file.file_name,
                summary: summary.into_inner(),
            }))
        }
        Err(e) => {
            let status = match &e {
                SummaryError::UnsupportedFileType(_) => {
                    warn!(user_id = %user.user_id, file_name = %file.file_name, "Rejected upload: {}", e);
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
                _ => {
                    error!(user_id = %user.user_id, file_name = %file.file_name, "Error processing file: {:?}", e);
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            };
            guard.fail(e.user_message());
            Err(error_reply(status, e.user_message()))
        }
    }
}

/// Report the state of the caller's latest upload.
#[utoipa::path(
    get,
    path = "/summaries/current",
    responses(
        (status = 200, description = "Latest upload state", body = UploadStatus),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn current_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<UploadStatus> {
    Json(app_state.uploads.status(user.user_id))
}

/// List the accepted document formats.
#[utoipa::path(
    get,
    path = "/formats",
    responses(
        (status = 200, description = "Accepted file extensions", body = FormatsResponse)
    )
)]
pub async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        accept: ACCEPT_ATTRIBUTE.to_string(),
    })
}
