//! REST endpoints for resume and job-description parsing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, warn};

use super::parser::{DocumentParser, FileUpload};
use crate::error::DocumentError;

#[derive(Clone)]
pub struct DocumentRouteState {
    pub parser: Arc<DocumentParser>,
}

/// POST /parse/resume
async fn parse_resume(
    State(state): State<DocumentRouteState>,
    Json(upload): Json<FileUpload>,
) -> Response {
    match state.parser.parse_resume(&upload).await {
        Ok(resume) => Json(resume).into_response(),
        Err(e) => error_response(&upload.file_name, &e),
    }
}

/// POST /parse/jd
async fn parse_jd(
    State(state): State<DocumentRouteState>,
    Json(upload): Json<FileUpload>,
) -> Response {
    match state.parser.parse_job_description(&upload).await {
        Ok(jd) => Json(jd).into_response(),
        Err(e) => error_response(&upload.file_name, &e),
    }
}

/// Map a document error to a status and a short message.
pub fn error_status(e: &DocumentError) -> (StatusCode, String) {
    match e {
        DocumentError::InvalidEncoding(_) => (
            StatusCode::BAD_REQUEST,
            "File content is not valid base64".to_string(),
        ),
        DocumentError::UnsupportedFormat { .. } => (
            StatusCode::BAD_REQUEST,
            "Unsupported file format. Only PDF, DOCX, and TXT are supported.".to_string(),
        ),
        DocumentError::EmptyText { .. } => (StatusCode::BAD_REQUEST, "Empty text".to_string()),
        DocumentError::Extraction(_) => (
            StatusCode::BAD_REQUEST,
            "Could not read text from the file".to_string(),
        ),
        DocumentError::ExtractorUnavailable { format } => (
            StatusCode::NOT_IMPLEMENTED,
            format!("{} files are not supported by this server yet", format.to_uppercase()),
        ),
        DocumentError::Llm(_) => (
            StatusCode::BAD_GATEWAY,
            "Could not parse the document. Please try again.".to_string(),
        ),
    }
}

fn error_response(file_name: &str, e: &DocumentError) -> Response {
    let (status, message) = error_status(e);
    if status.is_server_error() {
        error!(file = %file_name, error = %e, "Document parsing failed");
    } else {
        warn!(file = %file_name, error = %e, "Rejected document upload");
    }
    (status, Json(json!({"error": message}))).into_response()
}

/// Build the document parsing routes.
pub fn document_routes(state: DocumentRouteState) -> Router {
    Router::new()
        .route("/parse/resume", post(parse_resume))
        .route("/parse/jd", post(parse_jd))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    #[test]
    fn client_errors_are_400() {
        for e in [
            DocumentError::InvalidEncoding("bad".into()),
            DocumentError::UnsupportedFormat {
                file_name: "a.png".into(),
            },
            DocumentError::EmptyText {
                file_name: "a.txt".into(),
            },
        ] {
            assert_eq!(error_status(&e).0, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn missing_extractor_is_501() {
        let (status, message) = error_status(&DocumentError::ExtractorUnavailable {
            format: "pdf".into(),
        });
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(message.starts_with("PDF"));
    }

    #[test]
    fn model_failures_are_502_without_detail() {
        let e = DocumentError::Llm(LlmError::AuthFailed {
            provider: "groq".into(),
        });
        let (status, message) = error_status(&e);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!message.contains("groq"));
    }
}
