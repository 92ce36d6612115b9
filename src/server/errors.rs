use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::params::ErrorResponse;
use crate::fetch::FetchError;
use crate::gemini::GeminiError;
use crate::search::engine::ResearchError;
use crate::serper::SerperError;
use crate::summarize::SummarizeError;

/// JSON error reply: `{"error": "..."}` with an HTTP status.
#[derive(Debug)]
pub(super) struct ApiError {
    pub(super) status: StatusCode,
    pub(super) message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn retriable(e: &impl std::fmt::Display) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, format!("{e} (retriable)"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<ResearchError> for ApiError {
    fn from(e: ResearchError) -> Self {
        let error = research_to_api_error(e);
        if error.status.is_server_error() {
            warn!(status = error.status.as_u16(), error = %error.message, "research request failed");
        }
        error
    }
}

fn research_to_api_error(e: ResearchError) -> ApiError {
    match &e {
        ResearchError::EmptyTitle => ApiError::new(StatusCode::BAD_REQUEST, e.to_string()),
        ResearchError::PdfNotFound(_) => ApiError::new(StatusCode::NOT_FOUND, e.to_string()),
        ResearchError::Search(inner) => search_to_api_error(inner, &e),
        ResearchError::Fetch(FetchError::NotPdf { .. } | FetchError::TooLarge) => {
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        ResearchError::Fetch(_) => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
        ResearchError::Pdf(_) => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        ResearchError::Summarize(inner) => summarize_to_api_error(inner, &e),
    }
}

fn search_to_api_error(inner: &SerperError, e: &ResearchError) -> ApiError {
    match inner {
        SerperError::ApiKeyNotSet => ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        SerperError::RateLimited => ApiError::retriable(e),
        SerperError::Unauthorized(_) => ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("{e}; check that SERPER_API_KEY is valid"),
        ),
        _ => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

fn summarize_to_api_error(inner: &SummarizeError, e: &ResearchError) -> ApiError {
    match inner {
        SummarizeError::Llm(GeminiError::ApiKeyNotSet) => {
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        SummarizeError::Llm(GeminiError::RateLimited) => ApiError::retriable(e),
        SummarizeError::Llm(GeminiError::QuotaExhausted(_)) => ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("{e}; check your API billing at https://aistudio.google.com"),
        ),
        SummarizeError::EmptyInput => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        SummarizeError::InvalidConfig(_) => {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        _ => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
