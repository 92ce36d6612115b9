mod cli;
mod fetch;
mod gemini;
mod markdown;
mod pdf;
mod retry;
mod search;
mod serper;
mod server;
mod summarize;

pub const USER_AGENT: &str = concat!("paperscout/", env!("CARGO_PKG_VERSION"));

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

use cli::{Cli, Command};
use gemini::GeminiClient;
use search::engine::{self, Researcher};
use serper::SerperClient;
use summarize::Summarizer;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default per-request timeout; clients with slower calls set their own.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_REDIRECTS: usize = 5;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paperscout=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let researcher = build_researcher(&cli)?;

    match cli.command {
        Command::Serve { bind } => {
            info!(
                search = researcher.has_search(),
                llm = researcher.has_llm(),
                "starting paperscout server"
            );
            server::serve(researcher, bind).await?;
        }
        Command::Research { title, json } => match researcher.research(&title).await {
            Ok(report) if json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "paper_title": report.paper_title,
                    "pdf_url": report.pdf_url,
                    "summary": report.summary,
                    "text_chars": report.text_chars,
                    "chunks": report.chunks,
                }))?
            ),
            Ok(report) => print!("{}", engine::format_report(&report)),
            Err(e) => {
                error!("{e}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Find { title } => match researcher.find(&title).await {
            Ok(found) => println!("{}", found.link),
            Err(e) => {
                error!("{e}");
                return Ok(ExitCode::FAILURE);
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn build_researcher(cli: &Cli) -> Result<Researcher, Box<dyn std::error::Error>> {
    let fetch_policy = cli.pipeline.fetch_policy();
    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(fetch::redirect_policy(fetch_policy, MAX_REDIRECTS))
        .build()?;

    let search = SerperClient::from_env(http.clone())
        .inspect_err(|e| warn!("search client not available: {e}"))
        .ok();
    let llm = GeminiClient::from_env(http.clone())
        .inspect_err(|e| warn!("Gemini client not available: {e}"))
        .ok();
    if let Some(llm) = &llm {
        info!(model = %llm.model(), "using Gemini model");
    }

    let summarizer = Summarizer::new(cli.pipeline.summarize_config())?;
    Ok(Researcher::new(
        http,
        search,
        llm,
        summarizer,
        fetch_policy,
    ))
}
