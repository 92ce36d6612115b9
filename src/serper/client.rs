use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ErrorBody, OrganicResult, SearchRequest, SearchResponse};
use crate::retry::with_retries;

const API_BASE: &str = "https://google.serper.dev";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum SerperError {
    #[error("SERPER_API_KEY not set. Get one at https://serper.dev")]
    ApiKeyNotSet,

    #[error("Search rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Search API rejected the key: {0}")]
    Unauthorized(String),

    #[error("Search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SerperError {
    fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Api { code, .. } => (500..600).contains(code),
            _ => false,
        }
    }
}

/// Web search returning organic results.
/// Implemented by `SerperClient` for production; mock implementations used in tests.
pub trait PaperSearch {
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, SerperError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct SerperClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl SerperClient {
    /// Reads `SERPER_API_KEY`, falling back to the older `SERP_API_KEY` name.
    pub fn from_env(http: Client) -> Result<Self, SerperError> {
        Self::from_lookup(http, |name| env::var(name).ok())
    }

    fn from_lookup(
        http: Client,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SerperError> {
        let api_key = ["SERPER_API_KEY", "SERP_API_KEY"]
            .into_iter()
            .filter_map(lookup)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or(SerperError::ApiKeyNotSet)?;
        Ok(Self {
            http,
            api_key: ApiKey(api_key),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.to_string(),
        }
    }

    async fn post_search(&self, query: &str) -> Result<SearchResponse, SerperError> {
        let url = format!("{}/search", self.base_url);

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&SearchRequest { q: query })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: SearchResponse = response.json().await?;
            debug!(results = body.organic.len(), "serper search complete");
            return Ok(body);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(ErrorBody { message: Some(m) }) => m,
            _ => {
                let end = text.floor_char_boundary(200);
                format!("HTTP {status}: {}", &text[..end])
            }
        };

        let err = classify_status(status.as_u16(), message);
        warn!(error = %err, "Serper API error");
        Err(err)
    }
}

impl PaperSearch for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, SerperError> {
        let response =
            with_retries("serper", SerperError::is_transient, move || self.post_search(query))
                .await?;
        Ok(response.organic)
    }
}

fn classify_status(code: u16, message: String) -> SerperError {
    match code {
        429 => SerperError::RateLimited,
        401 | 403 => SerperError::Unauthorized(message),
        _ => SerperError::Api { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429_as_rate_limited() {
        assert!(matches!(
            classify_status(429, "slow down".into()),
            SerperError::RateLimited
        ));
    }

    #[test]
    fn classify_auth_failures() {
        for code in [401, 403] {
            assert!(matches!(
                classify_status(code, "Unauthorized.".into()),
                SerperError::Unauthorized(_)
            ));
        }
    }

    #[test]
    fn classify_other_codes_as_api_error() {
        match classify_status(400, "bad query".into()) {
            SerperError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "bad query");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        assert!(SerperError::RateLimited.is_transient());
        assert!(classify_status(502, String::new()).is_transient());
        assert!(!classify_status(401, String::new()).is_transient());
        assert!(!classify_status(400, String::new()).is_transient());
    }

    fn key_of(client: &SerperClient) -> &str {
        &client.api_key.0
    }

    #[test]
    fn key_prefers_serper_name_then_falls_back() {
        let both = |name: &str| match name {
            "SERPER_API_KEY" => Some("new".to_string()),
            "SERP_API_KEY" => Some("old".to_string()),
            _ => None,
        };
        assert_eq!(key_of(&SerperClient::from_lookup(Client::new(), both).unwrap()), "new");

        let legacy_only = |name: &str| (name == "SERP_API_KEY").then(|| " old ".to_string());
        assert_eq!(
            key_of(&SerperClient::from_lookup(Client::new(), legacy_only).unwrap()),
            "old"
        );

        let blank_primary = |name: &str| match name {
            "SERPER_API_KEY" => Some("   ".to_string()),
            "SERP_API_KEY" => Some("old".to_string()),
            _ => None,
        };
        assert_eq!(
            key_of(&SerperClient::from_lookup(Client::new(), blank_primary).unwrap()),
            "old"
        );
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(
            SerperClient::from_lookup(Client::new(), |_: &str| None),
            Err(SerperError::ApiKeyNotSet)
        ));
        assert!(matches!(
            SerperClient::from_lookup(Client::new(), |_: &str| Some("  ".to_string())),
            Err(SerperError::ApiKeyNotSet)
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = SerperClient::with_base_url(Client::new(), "http://localhost");
        assert!(!format!("{client:?}").contains("test-key"));
    }
}
