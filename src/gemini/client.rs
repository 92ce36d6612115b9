use std::env;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::answer::extract_answer;
use super::types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::retry::with_retries;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Long papers produce long prompts; generation can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const ERROR_SNIPPET_BYTES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    ApiKeyNotSet,

    #[error("Gemini rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Gemini quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Gemini API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GeminiError {
    fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Api { code, .. } => (500..600).contains(code),
            _ => false,
        }
    }

    /// Maps the `error` object of a Gemini response body.
    fn from_api(err: &ApiError) -> Self {
        let message = err.message.as_deref().unwrap_or("Unknown error").to_string();
        match err.code {
            Some(429) => Self::RateLimited,
            Some(403) => Self::QuotaExhausted(message),
            Some(code) => Self::Api { code, message },
            None => Self::Api {
                code: 0,
                message: format!("no status code in error body: {message}"),
            },
        }
    }
}

/// Text generation backend used by the summarizer.
pub trait LanguageModel {
    /// Returns `Ok(None)` when the model answered with no text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GeminiError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Reads `GEMINI_API_KEY` and the optional `GEMINI_MODEL` override.
    pub fn from_env(http: Client) -> Result<Self, GeminiError> {
        Self::from_lookup(http, |name| env::var(name).ok())
    }

    fn from_lookup(
        http: Client,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GeminiError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let api_key = non_empty("GEMINI_API_KEY").ok_or(GeminiError::ApiKeyNotSet)?;
        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key),
            model,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse, GeminiError> {
        let endpoint = format!("{}/{}:generateContent", self.base_url, self.model);
        debug_assert!(
            endpoint.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig { temperature: 0.0 }),
        };

        let response = self
            .http
            .post(&endpoint)
            .timeout(REQUEST_TIMEOUT)
            .header("User-Agent", crate::USER_AGENT)
            .header("x-goog-api-key", &self.api_key.0)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_status(status, &body);
            warn!(status = status.as_u16(), error = %err, "Gemini request failed");
            return Err(err);
        }

        let body: GenerateContentResponse = response.json().await?;
        if let Some(api_error) = &body.error {
            let err = GeminiError::from_api(api_error);
            warn!(error = %err, "Gemini reported an error with status 200");
            return Err(err);
        }

        debug!(model = %self.model, prompt_chars = prompt.len(), "generation complete");
        Ok(body)
    }
}

impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GeminiError> {
        let response = with_retries("gemini", GeminiError::is_transient, move || {
            self.generate_content(prompt)
        })
        .await?;
        Ok(extract_answer(&response))
    }
}

/// Classifies a non-2xx reply, preferring the structured `error` object.
fn error_from_status(status: StatusCode, body: &str) -> GeminiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return GeminiError::RateLimited;
    }
    if let Ok(parsed) = serde_json::from_str::<GenerateContentResponse>(body)
        && let Some(api_error) = &parsed.error
    {
        return GeminiError::from_api(api_error);
    }
    let end = body.floor_char_boundary(ERROR_SNIPPET_BYTES);
    let message = format!("HTTP {status}: {}", &body[..end]);
    if status == StatusCode::FORBIDDEN {
        return GeminiError::QuotaExhausted(message);
    }
    GeminiError::Api {
        code: status.as_u16(),
        message,
    }
}
