mod client;
mod config;
mod conversation;
mod render;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use crate::config::Config;
use crate::ui::ChatApp;

#[derive(Parser)]
#[command(name = "askr")]
#[command(version)]
#[command(about = "Single-session LLM chat console for the terminal", long_about = None)]
struct Cli {
    /// Model identifier sent with every completion request
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the completion endpoint
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    init_logging()?;

    ChatApp::new(config).run().await
}

/// Diagnostics go to a file; the terminal belongs to the TUI.
fn init_logging() -> Result<()> {
    let log_path = config::askr_home()?.join("askr.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
