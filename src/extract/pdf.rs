use lopdf::Document;

use super::{ExtractionError, join_units};

/// Extract text page by page; pages without extractable text contribute nothing.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    tracing::debug!(pages = pages.len(), "Loaded PDF");

    Ok(join_units(
        "page",
        pages
            .keys()
            .map(|&page_number| document.extract_text(&[page_number])),
    ))
}
