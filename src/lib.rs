//! Opinion reference extraction.
//!
//! Recognizes Attorney General opinion citations (OAG, ORD, OMD) in an
//! opinion's text, normalizes every spelling to one canonical form, and
//! reports which other opinions a document cites.
//!
//! - `citations`: normalization of a single citation fragment
//! - `references`: whole-document scanning into a reference map
//! - `render`: PDF to plain text, running headers removed
//! - `fetch`: downloading opinion PDFs
//! - `handlers`: HTTP routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod citations;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod references;
pub mod render;
pub mod url_validator;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        let client = fetch::build_client(&config)?;
        Ok(Self { config, client })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/opinion", get(handlers::opinion))
        .route("/api/scan", post(handlers::scan))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use citations::{normalize_citation, pad_number, NO_NUMBER_IN_ORIGINAL};
pub use config::AppConfig;
pub use error::ServiceError;
pub use models::{OpinionQuery, OpinionRecord, ReferenceEntry, ScanRequest, ScanResponse};
pub use references::{extract_references, scan_references, ReferenceMap};
pub use render::{pdf_to_text, render_pages};
pub use url_validator::{validate_url, UrlValidationError};
