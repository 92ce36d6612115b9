use tracing::{debug, warn};

use crate::serper::{OrganicResult, PaperSearch, SerperError};

/// Builds the search query that restricts results to PDF files.
pub fn pdf_query(title: &str) -> String {
    format!("{} filetype:pdf", title.trim())
}

/// First result that looks like a PDF: the title mentions "pdf" or the link
/// points at a `.pdf` file. Returns the link as the search API gave it.
pub fn find_pdf_link(results: &[OrganicResult]) -> Option<&OrganicResult> {
    results
        .iter()
        .filter(|r| !r.link.trim().is_empty())
        .find(|r| r.title.to_lowercase().contains("pdf") || is_pdf_link(&r.link))
}

fn is_pdf_link(link: &str) -> bool {
    let lower = link.to_lowercase();
    if lower.ends_with(".pdf") {
        return true;
    }
    // "https://host/paper.pdf?download=1" still names a PDF file
    url::Url::parse(&lower).is_ok_and(|u| u.path().ends_with(".pdf"))
}

/// Runs the PDF search for `title` and picks a candidate.
/// `Ok(None)` means the search worked but nothing looked like a PDF.
pub async fn locate_pdf(
    search: &impl PaperSearch,
    title: &str,
) -> Result<Option<OrganicResult>, SerperError> {
    let query = pdf_query(title);
    let results = search.search(&query).await?;
    debug!(query = %query, results = results.len(), "search results received");

    let found = find_pdf_link(&results).cloned();
    match &found {
        Some(r) => debug!(
            result_title = %r.title,
            snippet = r.snippet.as_deref().unwrap_or(""),
            "PDF candidate selected"
        ),
        None => warn!(title = %title, "no direct PDF link found in the search results"),
    }
    Ok(found)
}
