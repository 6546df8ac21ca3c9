//! Rendering an opinion PDF to plain text for reference scanning.

use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

use crate::error::ServiceError;
use crate::references::scan_references;

lazy_static! {
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").unwrap();
}

// ============================================================================
// Text Cleanup
// ============================================================================

/// Matches the running header/footer "<citation> Page <n>" printed on every
/// page of an opinion. `None` for a blank citation.
fn running_header(self_citation: &str) -> Option<Regex> {
    let citation = self_citation.trim();
    if citation.is_empty() {
        return None;
    }
    Regex::new(&format!(r"{}\s+Page [0-9]+(?:\s+|$)", regex::escape(citation))).ok()
}

fn clean_page(page: &str, header: Option<&Regex>) -> String {
    let page = match header {
        Some(re) => re.replace_all(page, " "),
        None => page.into(),
    };
    BLANK_LINES.replace_all(page.trim(), "\n\n").trim().to_string()
}

/// Clean each page (blank-line runs collapsed, running headers removed) and
/// join the non-empty pages with a newline.
pub fn render_pages<'a, I>(pages: I, self_citation: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let header = running_header(self_citation);
    pages
        .into_iter()
        .map(|page| clean_page(page, header.as_ref()))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// PDF Text Extraction
// ============================================================================

/// Extract text using the `pdf-extract` crate (no external dependency).
fn run_pdf_extract(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("pdf-extract failed: {}", e))
}

/// Write the PDF to a fresh temp file. The file is created exclusively with
/// a random name and is removed when the handle drops.
fn stage_pdf(bytes: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = tempfile::Builder::new()
        .prefix("opinion-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| format!("Cannot stage PDF: {}", e))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| format!("Cannot stage PDF: {}", e))?;
    Ok(file)
}

/// Run `pdftotext` on a staged copy of the PDF. Pages come back separated
/// by form feeds.
fn run_pdftotext(bytes: &[u8]) -> Result<String, String> {
    let staged = stage_pdf(bytes)?;

    let output = Command::new("pdftotext")
        .arg(staged.path())
        .arg("-")
        .output()
        .map_err(|e| format!("Failed to run pdftotext: {}. Is poppler installed?", e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("pdftotext failed: {}", stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

type Extractor = fn(&[u8]) -> Result<String, String>;

/// Keep the rendering with the most recognized citations. Unrecognized
/// fragments don't count. Ties keep the earlier method.
fn select_rendering<I>(attempts: I, self_citation: &str) -> Result<String, ServiceError>
where
    I: IntoIterator<Item = (&'static str, Result<String, String>)>,
{
    let mut best: Option<(String, usize)> = None;
    let mut failures = Vec::new();

    for (method, attempt) in attempts {
        match attempt {
            Ok(raw) => {
                let text = render_pages(raw.split('\x0c'), self_citation);
                let found = scan_references(&text).citations().count();
                tracing::debug!(method, found, "rendered document");
                if best.as_ref().map_or(true, |(_, n)| found > *n) {
                    best = Some((text, found));
                }
            }
            Err(e) => {
                tracing::debug!(method, error = %e, "extraction failed");
                failures.push(e);
            }
        }
    }

    best.map(|(text, _)| text)
        .ok_or_else(|| ServiceError::Render(failures.join("; ")))
}

/// Render a PDF to text, trying each extraction method and keeping whichever
/// rendering yields the most citations.
pub fn pdf_to_text(bytes: &[u8], self_citation: &str) -> Result<String, ServiceError> {
    let extractors: [(&'static str, Extractor); 2] =
        [("pdf-extract", run_pdf_extract), ("pdftotext", run_pdftotext)];
    select_rendering(
        extractors
            .into_iter()
            .map(|(method, extract)| (method, extract(bytes))),
        self_citation,
    )
}
