use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ResearchQuery {
    /// Title of the paper to look up.
    pub paper_title: String,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub paper_title: String,
    pub pdf_url: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Search API key configured.
    pub search: bool,
    /// LLM API key configured.
    pub llm: bool,
}
