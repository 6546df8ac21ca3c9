//! Request and response payloads for the HTTP API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Opinion Lookup
// ============================================================================

/// Query for `GET /opinion`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpinionQuery {
    /// Location of the opinion PDF.
    pub url: String,
    /// The opinion's own citation, e.g. `94-ORD-58`. Used to strip running
    /// headers and to drop self-references.
    #[serde(default)]
    pub citation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionRecord {
    pub text: String,
    /// Canonical citations of other opinions, in first-seen order.
    pub references: Vec<String>,
    /// Citation-shaped fragments no normalization rule recognized.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

// ============================================================================
// Text Scan
// ============================================================================

/// Body for `POST /api/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub text: String,
    #[serde(default)]
    pub citation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub citation: String,
    /// Raw text that produced this citation.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub references: Vec<ReferenceEntry>,
    pub unrecognized: Vec<String>,
}
