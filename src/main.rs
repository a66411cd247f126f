//! `company-research`: research one company from the command line and
//! print the consolidated record as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use company_research::{ApiKeys, ResearchConfig, ResearchError, ResearchOrchestrator};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "company-research", version, about = "Aggregate public data about a company")]
struct Cli {
    /// Company name, e.g. "Microsoft" or "$TSLA".
    name: String,

    /// Print the stored record instead of running the collectors.
    #[arg(long)]
    latest: bool,

    /// Config file (TOML or JSON); overrides RESEARCH_CONFIG_PATH.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Compact logs on stderr; `RESEARCH_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("company_research=info,warn"));
    let json = std::env::var("RESEARCH_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env first so API keys and RUST_LOG are visible below.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "research run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.name.trim().is_empty() {
        eprintln!("{}", ResearchError::BlankName);
        return Ok(ExitCode::from(2));
    }
    let cfg = match &cli.config {
        Some(p) => ResearchConfig::load_from(p)?,
        None => ResearchConfig::load_default()?,
    };
    let keys = ApiKeys::from_env();
    let orchestrator = ResearchOrchestrator::from_config(&cfg, &keys)?;

    let record = if cli.latest {
        match orchestrator.latest(&cli.name).await? {
            Some(r) => r,
            None => {
                eprintln!("no stored research for {:?}", cli.name.trim());
                return Ok(ExitCode::from(1));
            }
        }
    } else {
        match orchestrator.research_company(&cli.name).await {
            Ok(r) => r,
            Err(e @ ResearchError::BlankName) => {
                eprintln!("{e}");
                return Ok(ExitCode::from(2));
            }
        }
    };

    let json = serde_json::to_string_pretty(&record).context("serializing research record")?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}
