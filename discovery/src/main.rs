//! Voice agent discovery CLI.
//!
//! Places test calls for seed prompts, follows the suggested scenarios each
//! analysis proposes, and writes everything discovered to
//! `results/discovered_scenarios.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use voice_discovery::exit_codes;
use voice_discovery::io::config::{
    ApiSettings, DEFAULT_CONFIG_PATH, DEFAULT_MEDIA_URL, DEFAULT_PHONE_NUMBER,
    DEFAULT_START_CALL_URL, DiscoveryConfig, load_config, write_config,
};
use voice_discovery::io::results::load_results;
use voice_discovery::logging;
use voice_discovery::session::{run_session, serve_receiver};

#[derive(Parser)]
#[command(
    name = "voice-discovery",
    version,
    about = "Discover voice agent capabilities by placing test calls"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if missing.
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Place calls for the seed prompts and explore suggested scenarios.
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Seed prompt (repeatable). Defaults to the seeds in the config file.
        #[arg(long = "seed")]
        seeds: Vec<String>,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Serve only the notification receiver until Ctrl-C.
    Serve {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
        webhook_secret: Option<String>,
    },
    /// Summarize the results file of a previous run.
    Report {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

/// Credentials and endpoints, usually taken from the environment or `.env`.
#[derive(Args)]
struct ApiArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,
    #[arg(long, env = "HAMMING_API_TOKEN", hide_env_values = true)]
    call_api_token: String,
    /// Public URL the call system posts notifications to.
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: String,
    #[arg(long, env = "TEST_PHONE_NUMBER", default_value = DEFAULT_PHONE_NUMBER)]
    phone_number: String,
    #[arg(long, env = "START_CALL_URL", default_value = DEFAULT_START_CALL_URL)]
    start_call_url: String,
    #[arg(long, env = "MEDIA_URL", default_value = DEFAULT_MEDIA_URL)]
    media_url: String,
    /// Shared secret notifications must carry in `X-Webhook-Secret`.
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,
}

impl From<ApiArgs> for ApiSettings {
    fn from(args: ApiArgs) -> Self {
        Self {
            openai_api_key: args.openai_api_key,
            call_api_token: args.call_api_token,
            webhook_url: args.webhook_url,
            phone_number: args.phone_number,
            start_call_url: args.start_call_url,
            media_url: args.media_url,
            webhook_secret: args.webhook_secret,
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    logging::init();
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { config, force } => cmd_init(&config, force),
        Command::Run { config, seeds, api } => cmd_run(&config, seeds, api.into()).await,
        Command::Serve {
            config,
            webhook_secret,
        } => cmd_serve(&config, webhook_secret).await,
        Command::Report { config } => cmd_report(&config),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        println!("init: {} exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    write_config(path, &DiscoveryConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("init: wrote {}", path.display());
    Ok(())
}

async fn cmd_run(path: &Path, seeds: Vec<String>, api: ApiSettings) -> Result<()> {
    let config = load_config(path)?;
    let seeds = if seeds.is_empty() {
        config.seeds.clone()
    } else {
        seeds
    };
    let summary = run_session(&config, &api, &seeds).await?;
    println!(
        "run: calls={} discovered={} failed={} skipped={} results={}",
        summary.calls_placed,
        summary.discovered,
        summary.failed,
        summary.skipped,
        summary.results_path.display()
    );
    Ok(())
}

async fn cmd_serve(path: &Path, webhook_secret: Option<String>) -> Result<()> {
    let config = load_config(path)?;
    serve_receiver(&config, webhook_secret).await
}

fn cmd_report(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let results_path = config.results_path();
    let scenarios = load_results(&results_path)?;
    println!(
        "report: scenarios={} results={}",
        scenarios.len(),
        results_path.display()
    );
    for (prompt, analysis) in &scenarios {
        println!(
            "report: prompt={:?} intent={:?} capabilities={} limitations={} suggestions={}",
            prompt,
            analysis.primary_intent,
            analysis.capabilities.len(),
            analysis.limitations.len(),
            analysis.suggested_scenarios.len()
        );
    }
    Ok(())
}
