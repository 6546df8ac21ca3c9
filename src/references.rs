//! Reference scanning: find every citation-shaped fragment in an opinion's
//! text, normalize it, and group the raw fragments by canonical citation.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::citations::normalize_citation;

#[cfg(test)]
#[path = "references_test.rs"]
mod references_test;

lazy_static! {
    // One "OAG"/"OAGs"/"(OAG)" token followed by a list of bare series-number
    // pairs joined by commas, semicolons or "and":
    //   OAGs 84-22, 84-36, and 84-203
    //   (OAG) 84-22; 84-36; 84-203
    static ref CITATION_LIST: Regex =
        Regex::new(r"OAG[s)\]]? [0-9]{2,4}-[0-9]{1,3}(?:[,;]? (?:and )?[0-9]{2,4}-[0-9]{1,3})*").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"[0-9]{2,4}-[0-9]{1,3}").unwrap();

    // Single references, applied in this order.
    static ref SINGLE_CITATIONS: Vec<Regex> = [
        r"[0-9]{2,3}-ORD-[0-9]{1,3}",
        r"ORD [0-9]{2,3}-[0-9]{1,3}",
        r"[0-9]{2,3}-OMD-[0-9]{1,3}",
        r"OMD [0-9]{2,3}-[0-9]{1,3}",
        r"[O0][Aa][Gg] ?N?o?\.? ?[0-9]{2,4}[ \-][0-9]{1,3}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

// ============================================================================
// Reference Map
// ============================================================================

/// Canonical citation -> raw fragments that normalized to it.
///
/// Keys keep first-seen order. `None` collects fragments that looked like
/// citations but matched no normalization rule. Fragments are deduplicated
/// by exact text, so two different spellings of the same citation are both
/// kept while a repeated spelling is kept once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    entries: IndexMap<Option<String>, Vec<String>>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `raw` as evidence for `citation`. Returns false when this exact
    /// fragment was already recorded under that key.
    pub fn record(&mut self, citation: Option<String>, raw: &str) -> bool {
        let sources = self.entries.entry(citation).or_default();
        if sources.iter().any(|s| s == raw) {
            return false;
        }
        sources.push(raw.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, citation: &str) -> bool {
        self.get(Some(citation)).is_some()
    }

    /// Raw fragments recorded under `citation` (`None` for unrecognized).
    pub fn get(&self, citation: Option<&str>) -> Option<&[String]> {
        self.entries
            .get(&citation.map(str::to_string))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_deref(), v.as_slice()))
    }

    /// All keys in first-seen order, `None` included.
    pub fn keys(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.keys().map(|k| k.as_deref())
    }

    /// Recognized citations in first-seen order.
    pub fn citations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().filter_map(|k| k.as_deref())
    }

    /// Fragments that were detected but could not be normalized.
    pub fn unrecognized(&self) -> &[String] {
        self.get(None).unwrap_or(&[])
    }

    /// Recognized citations other than the document's own. `self_citation`
    /// is compared both as given and in canonical form.
    pub fn references_excluding(&self, self_citation: &str) -> Vec<String> {
        let own = self_citation.trim();
        let own_canonical = normalize_citation(own);
        self.citations()
            .filter(|c| *c != own && Some(*c) != own_canonical.as_deref())
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Scanning
// ============================================================================

/// Scan a whole document body. Every pass runs over the full text; the same
/// substring may be caught by more than one pass and is deduplicated by the
/// map, not by the passes.
pub fn scan_references(text: &str) -> ReferenceMap {
    let mut map = ReferenceMap::new();

    // Citation lists: every pair is its own citation, and the whole run is
    // the evidence for each of them.
    for run in CITATION_LIST.find_iter(text) {
        for item in LIST_ITEM.find_iter(run.as_str()) {
            let citation = normalize_citation(&format!("OAG {}", item.as_str()));
            map.record(citation, run.as_str());
        }
    }

    for pattern in SINGLE_CITATIONS.iter() {
        for m in pattern.find_iter(text) {
            map.record(normalize_citation(m.as_str()), m.as_str());
        }
    }

    tracing::debug!(
        citations = map.citations().count(),
        unrecognized = map.unrecognized().len(),
        "scanned document for references"
    );
    map
}

/// Canonical citations referenced by `text`, excluding the document's own.
pub fn extract_references(text: &str, self_citation: &str) -> Vec<String> {
    scan_references(text).references_excluding(self_citation)
}
