//! Map-reduce summarization over a [`LanguageModel`].
//!
//! Chunking is done by the `text-splitter` crate. Text that fits in one
//! chunk is summarized with a single call. Longer text has each chunk
//! summarized (map) and the partial summaries combined (reduce). When the
//! partial summaries are themselves too long to combine in one prompt they
//! are collapsed group by group first.

mod prompts;

use futures::stream::{self, StreamExt, TryStreamExt};
use text_splitter::{Characters, ChunkConfig, TextSplitter};
use tracing::{debug, info, warn};

use crate::gemini::{GeminiError, LanguageModel};

pub const DEFAULT_CHUNK_SIZE: usize = 12_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 400;
pub const DEFAULT_MAX_CHUNKS: usize = 40;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_COMBINE_MAX_CHARS: usize = 24_000;
const MAX_COLLAPSE_ROUNDS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("invalid summarizer configuration: {0}")]
    InvalidConfig(String),

    #[error("nothing to summarize: extracted text is empty")]
    EmptyInput,

    #[error("language model returned an empty answer (possibly blocked by safety filters)")]
    EmptyAnswer,

    #[error("{0}")]
    Llm(#[from] GeminiError),
}

#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks past this count are dropped before the map step.
    pub max_chunks: usize,
    /// Map/collapse calls in flight at once.
    pub concurrency: usize,
    /// Largest combined partial-summary text sent in one reduce prompt.
    pub combine_max_chars: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            max_chunks: DEFAULT_MAX_CHUNKS,
            concurrency: DEFAULT_CONCURRENCY,
            combine_max_chars: DEFAULT_COMBINE_MAX_CHARS,
        }
    }
}

#[derive(Debug)]
pub struct Summary {
    pub text: String,
    /// Number of chunks that were summarized.
    pub chunks: usize,
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    config: SummarizeConfig,
}

impl Summarizer {
    pub fn new(config: SummarizeConfig) -> Result<Self, SummarizeError> {
        if config.max_chunks == 0 {
            return Err(SummarizeError::InvalidConfig(
                "max chunks must be > 0".to_string(),
            ));
        }
        splitter(&config)?;
        Ok(Self { config })
    }

    /// Chunks of at most `chunk_size` characters, trimmed, in document order.
    fn split(&self, text: &str) -> Result<Vec<String>, SummarizeError> {
        Ok(splitter(&self.config)?
            .chunks(text)
            .map(str::to_string)
            .collect())
    }

    pub async fn summarize(
        &self,
        llm: &impl LanguageModel,
        text: &str,
    ) -> Result<Summary, SummarizeError> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }
        let mut chunks = self.split(text)?;
        if chunks.is_empty() {
            return Err(SummarizeError::EmptyInput);
        }
        if chunks.len() > self.config.max_chunks {
            warn!(
                chunks = chunks.len(),
                kept = self.config.max_chunks,
                "document too long, summarizing the leading chunks only"
            );
            chunks.truncate(self.config.max_chunks);
        }

        if let [only] = chunks.as_slice() {
            debug!(chars = char_len(only), "summarizing in a single call");
            let text = generate(llm, &prompts::summarize_prompt(only)).await?;
            return Ok(Summary { text, chunks: 1 });
        }

        info!(chunks = chunks.len(), "summarizing chunks");
        let map_prompts: Vec<String> = chunks.iter().map(|c| prompts::map_prompt(c)).collect();
        let partials = self.run_all(llm, map_prompts).await?;
        let text = self.reduce(llm, partials).await?;

        Ok(Summary {
            text,
            chunks: chunks.len(),
        })
    }

    async fn reduce(
        &self,
        llm: &impl LanguageModel,
        mut summaries: Vec<String>,
    ) -> Result<String, SummarizeError> {
        let budget = self.config.combine_max_chars;
        let mut rounds = 0;
        while summaries.len() > 1 && joined_len(&summaries) > budget {
            if rounds == MAX_COLLAPSE_ROUNDS {
                warn!(
                    chars = joined_len(&summaries),
                    budget, "partial summaries still over budget, combining anyway"
                );
                break;
            }
            rounds += 1;
            let groups = group_by_budget(&summaries, budget);
            debug!(round = rounds, groups = groups.len(), "collapsing partial summaries");
            let group_prompts: Vec<String> =
                groups.iter().map(|g| prompts::combine_prompt(g)).collect();
            summaries = self.run_all(llm, group_prompts).await?;
        }

        generate(llm, &prompts::combine_prompt(&summaries.join("\n\n"))).await
    }

    /// Runs prompts with bounded concurrency, keeping input order.
    async fn run_all(
        &self,
        llm: &impl LanguageModel,
        prompts: Vec<String>,
    ) -> Result<Vec<String>, SummarizeError> {
        stream::iter(prompts)
            .map(|prompt| async move { generate(llm, &prompt).await })
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await
    }
}

async fn generate(llm: &impl LanguageModel, prompt: &str) -> Result<String, SummarizeError> {
    llm.generate(prompt)
        .await?
        .ok_or(SummarizeError::EmptyAnswer)
}

fn splitter(config: &SummarizeConfig) -> Result<TextSplitter<Characters>, SummarizeError> {
    if config.chunk_size == 0 {
        return Err(SummarizeError::InvalidConfig(
            "chunk size must be > 0".to_string(),
        ));
    }
    let chunk_config = ChunkConfig::new(config.chunk_size)
        .with_overlap(config.chunk_overlap)
        .map_err(|e| SummarizeError::InvalidConfig(e.to_string()))?;
    Ok(TextSplitter::new(chunk_config))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Length in chars of the summaries joined with `\n\n`.
fn joined_len(summaries: &[String]) -> usize {
    summaries.iter().map(|s| char_len(s)).sum::<usize>() + summaries.len().saturating_sub(1) * 2
}

/// Packs consecutive summaries into `\n\n`-joined groups of at most
/// `budget` chars. A summary longer than the budget becomes its own group.
fn group_by_budget(summaries: &[String], budget: usize) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for summary in summaries {
        let len = char_len(summary);
        if !current.is_empty() && current_len + 2 + len > budget {
            groups.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
            current_len += 2;
        }
        current.push_str(summary);
        current_len += len;
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
