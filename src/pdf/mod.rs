//! PDF text extraction.
//!
//! Parsing is delegated to `pdf-extract` on a blocking thread. The library
//! can panic on malformed input; that is contained by the blocking task and
//! reported as an extraction error instead of taking the server down.

mod normalize;
#[cfg(test)]
pub(crate) mod testing;

use tracing::{debug, warn};

pub use normalize::normalize_text;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("not a PDF document")]
    NotPdf,

    #[error("PDF text extraction failed: {0}")]
    Extraction(String),

    #[error("PDF contains no extractable text (scanned or image-only document)")]
    NoText,
}

pub async fn extract_text(bytes: Vec<u8>) -> Result<String, PdfError> {
    if !crate::fetch::looks_like_pdf(&bytes) {
        return Err(PdfError::NotPdf);
    }

    let size = bytes.len();
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            warn!(error = %e, "PDF extractor task failed");
            PdfError::Extraction("extractor crashed on this document".to_string())
        })?
        .map_err(|e| PdfError::Extraction(e.to_string()))?;

    let text = normalize_text(&raw);
    debug!(bytes = size, raw_chars = raw.len(), chars = text.len(), "PDF text extracted");

    if text.is_empty() {
        return Err(PdfError::NoText);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::single_page_pdf;

    #[tokio::test]
    async fn extracts_text_from_simple_pdf() {
        let pdf = single_page_pdf("Hello paper world");
        let text = extract_text(pdf).await.unwrap();
        assert!(text.contains("Hello"), "got: {text:?}");
    }

    #[tokio::test]
    async fn rejects_non_pdf_bytes() {
        let result = extract_text(b"<html>not a pdf</html>".to_vec()).await;
        assert!(matches!(result, Err(PdfError::NotPdf)));
    }

    #[tokio::test]
    async fn truncated_pdf_is_an_extraction_error() {
        let result = extract_text(b"%PDF-1.4\n1 0 obj\n<< /Type".to_vec()).await;
        assert!(matches!(result, Err(PdfError::Extraction(_))), "got: {result:?}");
    }
}
