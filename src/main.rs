//! Monet - LLM-powered iterative SVG art generator
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse_args();

    let default_filter = if cli.verbose() {
        "monet=info"
    } else {
        "monet=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = app::load_config()?;
    debug!(?config, "Configuration loaded");

    cli::run(cli, config).await
}
