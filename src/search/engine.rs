use reqwest::Client;
use tracing::info;

use crate::fetch::ssrf::redact_url_credentials;
use crate::fetch::{self, FetchError, FetchPolicy, TokioDnsResolver};
use crate::gemini::{GeminiClient, GeminiError, LanguageModel};
use crate::markdown;
use crate::pdf::{self, PdfError};
use crate::search::select::locate_pdf;
use crate::serper::{OrganicResult, PaperSearch, SerperClient, SerperError};
use crate::summarize::{SummarizeError, Summarizer};

#[derive(Debug)]
pub struct ResearchReport {
    pub paper_title: String,
    pub pdf_url: String,
    pub text_chars: usize,
    pub summary: String,
    pub chunks: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("paper_title must not be empty")]
    EmptyTitle,

    #[error("no PDF found for \"{0}\"")]
    PdfNotFound(String),

    #[error("search failed: {0}")]
    Search(#[from] SerperError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Pdf(#[from] PdfError),

    #[error("summarization failed: {0}")]
    Summarize(#[from] SummarizeError),
}

/// Runs the search → download → extract → summarize chain for one title.
///
/// Either client may be absent when its API key is not configured; requests
/// that need it then fail with the client's `ApiKeyNotSet` error.
#[derive(Debug)]
pub struct Researcher<S = SerperClient, L = GeminiClient> {
    http: Client,
    search: Option<S>,
    llm: Option<L>,
    summarizer: Summarizer,
    fetch_policy: FetchPolicy,
}

impl<S: PaperSearch, L: LanguageModel> Researcher<S, L> {
    pub fn new(
        http: Client,
        search: Option<S>,
        llm: Option<L>,
        summarizer: Summarizer,
        fetch_policy: FetchPolicy,
    ) -> Self {
        Self {
            http,
            search,
            llm,
            summarizer,
            fetch_policy,
        }
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    fn search(&self) -> Result<&S, ResearchError> {
        self.search
            .as_ref()
            .ok_or(ResearchError::Search(SerperError::ApiKeyNotSet))
    }

    fn llm(&self) -> Result<&L, ResearchError> {
        self.llm
            .as_ref()
            .ok_or(ResearchError::Summarize(SummarizeError::Llm(
                GeminiError::ApiKeyNotSet,
            )))
    }

    /// Search step only: the PDF result chosen for `title`.
    pub async fn find(&self, title: &str) -> Result<OrganicResult, ResearchError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ResearchError::EmptyTitle);
        }
        locate_pdf(self.search()?, title)
            .await?
            .ok_or_else(|| ResearchError::PdfNotFound(title.to_string()))
    }

    pub async fn research(&self, title: &str) -> Result<ResearchReport, ResearchError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ResearchError::EmptyTitle);
        }
        // fail before spending a search call when summarizing is impossible
        let llm = self.llm()?;

        info!(title = %title, "researching paper");
        let found = self.find(title).await?;
        info!(url = %redact_url_credentials(&found.link), "PDF found");

        let document =
            fetch::download_pdf(&self.http, &found.link, self.fetch_policy, &TokioDnsResolver)
                .await?;
        let pdf_url = document.url;
        let text = pdf::extract_text(document.bytes).await?;
        let text_chars = text.chars().count();

        let summary = self.summarizer.summarize(llm, &text).await?;
        info!(chars = text_chars, chunks = summary.chunks, "summary ready");

        Ok(ResearchReport {
            paper_title: title.to_string(),
            pdf_url,
            text_chars,
            summary: summary.text,
            chunks: summary.chunks,
        })
    }
}

pub fn format_report(report: &ResearchReport) -> String {
    format!(
        "{}\n\n{}\n\n---\n**Source:** {}\n_{} characters extracted, {} chunk(s) summarized_\n",
        markdown::heading(&report.paper_title),
        report.summary,
        markdown::link(&report.pdf_url, &report.pdf_url),
        report.text_chars,
        report.chunks,
    )
}
