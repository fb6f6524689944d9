// ABOUTME: Entry point for apoteker — a terminal chat client for a hosted LLM.
// ABOUTME: Parses CLI args, sets up file logging, loads config, and launches the app.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apoteker::app::App;
use apoteker::config::{Config, Overrides};

#[derive(Debug, Parser)]
#[command(name = "apoteker", version, about = "Chat with a pharmacist persona backed by a hosted LLM")]
struct Cli {
    /// Config file (default: ~/.apoteker/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generation service: gemini or responses
    #[arg(long)]
    provider: Option<String>,

    /// Model name passed to the generation service
    #[arg(long)]
    model: Option<String>,

    /// Seconds to wait for a reply before giving up on a turn
    #[arg(long)]
    timeout: Option<u64>,
}

/// Log to a file under the user's data dir; stdout belongs to the TUI.
fn init_logging() -> anyhow::Result<()> {
    let dir = Config::log_dir();
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("apoteker.log"))?;

    let filter = EnvFilter::try_from_env("APOTEKER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(&Overrides {
        provider: cli.provider,
        model: cli.model,
        timeout_seconds: cli.timeout,
    });

    App::new(config).run().await
}
