use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::fetch::FetchPolicy;
use crate::summarize::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY, DEFAULT_MAX_CHUNKS,
    SummarizeConfig,
};

/// Find a research paper's PDF on the web and summarize it.
///
/// API keys are read from the environment (or a `.env` file):
/// `SERPER_API_KEY` for search, `GEMINI_API_KEY` (and optional
/// `GEMINI_MODEL`) for summarization.
#[derive(Debug, Parser)]
#[command(name = "paperscout", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API and web UI
    Serve {
        /// Address to listen on
        #[arg(long, env = "PAPERSCOUT_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },

    /// Find, download and summarize one paper
    Research {
        /// Paper title
        title: String,

        /// Print the report as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },

    /// Print the PDF link the search step picks for a title
    Find {
        /// Paper title
        title: String,
    },
}

#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// Maximum characters per summarization chunk
    #[arg(long, global = true, env = "PAPERSCOUT_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, global = true, env = "PAPERSCOUT_CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Chunks past this count are not summarized
    #[arg(long, global = true, env = "PAPERSCOUT_MAX_CHUNKS", default_value_t = DEFAULT_MAX_CHUNKS)]
    pub max_chunks: usize,

    /// Concurrent LLM calls while summarizing chunks
    #[arg(long, global = true, env = "PAPERSCOUT_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Allow downloads from private and loopback addresses
    #[arg(
        long,
        global = true,
        env = "PAPERSCOUT_ALLOW_PRIVATE_HOSTS",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub allow_private_hosts: bool,
}

impl PipelineArgs {
    pub fn summarize_config(&self) -> SummarizeConfig {
        SummarizeConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            max_chunks: self.max_chunks,
            concurrency: self.concurrency,
            ..SummarizeConfig::default()
        }
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            allow_private_hosts: self.allow_private_hosts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn research_with_json_flag() {
        let cli = Cli::try_parse_from(["paperscout", "research", "Attention Is All You Need", "--json"])
            .unwrap();
        match cli.command {
            Command::Research { title, json } => {
                assert_eq!(title, "Attention Is All You Need");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pipeline_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "paperscout",
            "find",
            "ResNet",
            "--chunk-size",
            "500",
            "--allow-private-hosts",
        ])
        .unwrap();
        let config = cli.pipeline.summarize_config();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert!(cli.pipeline.fetch_policy().allow_private_hosts);
    }

    #[test]
    fn allow_private_hosts_accepts_numeric_env_value() {
        // SAFETY: no other test depends on this variable being unset
        unsafe { std::env::set_var("PAPERSCOUT_ALLOW_PRIVATE_HOSTS", "1") };
        let parsed = Cli::try_parse_from(["paperscout", "find", "ResNet"]);
        unsafe { std::env::remove_var("PAPERSCOUT_ALLOW_PRIVATE_HOSTS") };
        assert!(parsed.unwrap().pipeline.fetch_policy().allow_private_hosts);
    }

    #[test]
    fn serve_rejects_invalid_bind_address() {
        assert!(Cli::try_parse_from(["paperscout", "serve", "--bind", "not-an-addr"]).is_err());
    }
}
