//! PDF download with size limits and private-network protection.

pub mod ssrf;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

pub use ssrf::FetchPolicy;
pub(crate) use ssrf::{DnsResolver, TokioDnsResolver, redirect_policy};
use ssrf::redact_url_credentials;

pub(crate) const MAX_PDF_BYTES: usize = 25 * 1024 * 1024;
/// Covers the guard checks, redirects and the whole body download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(90);
const PDF_MAGIC: &[u8] = b"%PDF";
/// PDF readers accept junk before the header; allow a little of it.
const MAGIC_SEARCH_WINDOW: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("blocked: internal/private host not allowed")]
    InternalHost,

    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("download failed: status {0}")]
    Status(u16),

    #[error("PDF too large (>{} bytes)", MAX_PDF_BYTES)]
    TooLarge,

    #[error("not a PDF document (content-type: {content_type})")]
    NotPdf { content_type: String },

    #[error("{0}")]
    Timeout(String),
}

/// A downloaded PDF. `url` is the address after redirects.
#[derive(Debug)]
pub struct PdfDocument {
    pub url: String,
    pub bytes: Vec<u8>,
}

pub async fn download_pdf(
    client: &Client,
    url: &str,
    policy: FetchPolicy,
    resolver: &impl DnsResolver,
) -> Result<PdfDocument, FetchError> {
    tokio::time::timeout(DOWNLOAD_TIMEOUT, guarded_download(client, url, policy, resolver))
        .await
        .unwrap_or_else(|_| {
            Err(FetchError::Timeout(format!(
                "download timed out after {}s",
                DOWNLOAD_TIMEOUT.as_secs()
            )))
        })
}

async fn guarded_download(
    client: &Client,
    url: &str,
    policy: FetchPolicy,
    resolver: &impl DnsResolver,
) -> Result<PdfDocument, FetchError> {
    // DNS may still change between this check and reqwest's own lookup.
    let checked = policy.check(url, resolver).await?;

    let (final_url, content_type, bytes) = download(client, checked.as_str()).await?;

    // Redirects can land on an internal host.
    if final_url != checked.as_str() {
        policy.check(&final_url, resolver).await?;
    }

    if !looks_like_pdf(&bytes) {
        warn!(
            url = %redact_url_credentials(&final_url),
            content_type = %content_type,
            "downloaded document is not a PDF"
        );
        return Err(FetchError::NotPdf { content_type });
    }

    debug!(url = %redact_url_credentials(&final_url), bytes = bytes.len(), "PDF downloaded");
    Ok(PdfDocument {
        url: final_url,
        bytes,
    })
}

async fn download(client: &Client, url: &str) -> Result<(String, String, Vec<u8>), FetchError> {
    let mut response = client
        .get(url)
        .header("User-Agent", crate::USER_AGENT)
        .header("Accept", "application/pdf,*/*;q=0.8")
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    if let Some(len) = response.content_length()
        && len as usize > MAX_PDF_BYTES
    {
        return Err(FetchError::TooLarge);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_PDF_BYTES {
            return Err(FetchError::TooLarge);
        }
    }
    Ok((final_url, content_type, body))
}

pub(crate) fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|w| w == PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_at_start() {
        assert!(looks_like_pdf(b"%PDF-1.7\n%..."));
    }

    #[test]
    fn magic_bytes_after_leading_junk() {
        assert!(looks_like_pdf(b"\xef\xbb\xbf\r\n%PDF-1.4\n"));
    }

    #[test]
    fn html_is_not_pdf() {
        assert!(!looks_like_pdf(b"<!DOCTYPE html><html><body>Sign in</body></html>"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn magic_beyond_window_is_ignored() {
        let mut bytes = vec![b' '; MAGIC_SEARCH_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.5");
        assert!(!looks_like_pdf(&bytes));
    }
}
