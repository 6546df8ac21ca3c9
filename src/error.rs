//! Errors raised by the service layer around the citation engine.
//!
//! The normalizer and scanner never fail; everything here comes from
//! fetching, rendering, or serving a document.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::url_validator::UrlValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid document URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    #[error("Failed to fetch document: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Document server responded with HTTP {0}")]
    UpstreamStatus(u16),
    #[error("Refused redirect from document server: {0}")]
    RedirectRejected(UrlValidationError),
    #[error("Document too large: {size} bytes exceeds the {limit} byte limit")]
    DocumentTooLarge { size: u64, limit: u64 },
    #[error("Failed to render document: {0}")]
    Render(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ServiceError::Fetch(_)
            | ServiceError::UpstreamStatus(_)
            | ServiceError::RedirectRejected(_)
            | ServiceError::DocumentTooLarge { .. } => StatusCode::BAD_GATEWAY,
            ServiceError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Config(_) | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
