//! HTTP route handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::fetch::fetch_document;
use crate::models::{OpinionQuery, OpinionRecord, ReferenceEntry, ScanRequest, ScanResponse};
use crate::references::scan_references;
use crate::render::pdf_to_text;
use crate::AppState;

/// Build the response record for a rendered opinion.
pub fn build_record(text: String, self_citation: &str) -> OpinionRecord {
    let map = scan_references(&text);
    OpinionRecord {
        references: map.references_excluding(self_citation),
        unrecognized: map.unrecognized().to_vec(),
        text,
    }
}

/// GET /opinion?url=...&citation=...: fetch an opinion PDF, render it, and
/// list the other opinions it cites.
pub async fn opinion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OpinionQuery>,
) -> Result<Json<OpinionRecord>, ServiceError> {
    let bytes = fetch_document(&state.client, &state.config, &query.url).await?;

    // PDF parsing is CPU-bound; keep it off the async runtime.
    let citation = query.citation.clone();
    let text = tokio::task::spawn_blocking(move || pdf_to_text(&bytes, &citation)).await??;

    let record = build_record(text, &query.citation);
    tracing::info!(
        citation = %query.citation,
        references = record.references.len(),
        unrecognized = record.unrecognized.len(),
        "extracted opinion references"
    );
    Ok(Json(record))
}

/// POST /api/scan: scan already-rendered text; returns the evidence for
/// every citation found.
pub async fn scan(Json(req): Json<ScanRequest>) -> Json<ScanResponse> {
    let map = scan_references(&req.text);
    let keep = map.references_excluding(req.citation.as_deref().unwrap_or(""));

    let references = keep
        .into_iter()
        .map(|citation| ReferenceEntry {
            sources: map.get(Some(citation.as_str())).unwrap_or(&[]).to_vec(),
            citation,
        })
        .collect();

    Json(ScanResponse {
        references,
        unrecognized: map.unrecognized().to_vec(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}
