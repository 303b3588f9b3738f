//! PDF text extraction.

use std::path::Path;

use lopdf::Document;
use longhorn_core::{Error, Result};
use tracing::{debug, info};

/// Extract the text of every page, in page order, concatenated without separators.
///
/// A missing or unreadable file is an [`Error::Io`]; anything `lopdf` cannot
/// parse, or a page it cannot extract, is an [`Error::Pdf`].
pub fn load_pdf_text(path: &Path) -> Result<String> {
    let doc = open(path)?;
    let pages = doc.get_pages();

    let mut text = String::new();
    // BTreeMap keys are page numbers, so iteration is already in page order.
    for &page_num in pages.keys() {
        let page_text = doc.extract_text(&[page_num]).map_err(|e| {
            Error::Pdf(format!(
                "failed to extract page {} of {}: {}",
                page_num,
                path.display(),
                e
            ))
        })?;
        debug!("Page {}: {} chars", page_num, page_text.len());
        text.push_str(&page_text);
    }

    info!(
        "Loaded {}: {} pages, {} chars",
        path.display(),
        pages.len(),
        text.len()
    );
    Ok(text)
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> Result<usize> {
    Ok(open(path)?.get_pages().len())
}

fn open(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)?;
    Document::load_mem(&bytes)
        .map_err(|e| Error::Pdf(format!("failed to parse {}: {}", path.display(), e)))
}
