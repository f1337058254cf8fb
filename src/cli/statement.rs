//! `monet statement`

use crate::app::{make_provider, AppConfig};
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Args;
use monet_core::{
    generate_artist_statement, SessionLogger, FINAL_PNG, LOG_FILE_NAME, STATEMENT_FILE_NAME,
};
use std::fs;
use std::path::PathBuf;

/// Log of the statement turn, kept apart from the artist log it reads
const STATEMENT_LOG_FILE_NAME: &str = "_statement-log.txt";

/// Arguments for `monet statement`
#[derive(Args, Debug)]
pub struct StatementArgs {
    /// Session directory containing final.png and artist-log.txt
    pub output_dir: PathBuf,

    /// LLM provider
    #[arg(short, long, value_parser = ["anthropic", "gemini"])]
    pub provider: Option<String>,

    /// Model name override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Original prompt from the `Prompt: ` header line of an artist log
pub fn prompt_from_log(log: &str) -> &str {
    log.lines()
        .find_map(|line| line.strip_prefix("Prompt: "))
        .unwrap_or("unknown")
}

/// Generate, save and print an artist statement
pub async fn run(args: StatementArgs, config: &AppConfig) -> Result<()> {
    let dir = &args.output_dir;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let final_png = dir.join(FINAL_PNG);
    if !final_png.exists() {
        bail!("No {FINAL_PNG} found in {}", dir.display());
    }
    let png = fs::read(&final_png)
        .with_context(|| format!("Failed to read {}", final_png.display()))?;

    let log_path = dir.join(LOG_FILE_NAME);
    if !log_path.exists() {
        bail!("No {LOG_FILE_NAME} found in {}", dir.display());
    }
    let log_text = fs::read_to_string(&log_path)
        .with_context(|| format!("Failed to read {}", log_path.display()))?;

    let provider_name = args.provider.as_deref().unwrap_or(&config.drawing.provider);
    let model = args.model.as_deref().or(config.drawing.model.as_deref());
    let provider = make_provider(provider_name, model)?;

    let logger = SessionLogger::new(dir.join(STATEMENT_LOG_FILE_NAME), args.verbose);
    let (text, _response) = generate_artist_statement(
        provider.as_ref(),
        &STANDARD.encode(png),
        &[log_text.clone()],
        prompt_from_log(&log_text),
        &logger,
    )
    .await
    .context("Artist statement request failed")?;

    let statement_path = dir.join(STATEMENT_FILE_NAME);
    fs::write(&statement_path, &text)
        .with_context(|| format!("Failed to write {}", statement_path.display()))?;

    println!("{text}");
    println!("\nSaved to {}", statement_path.display());
    Ok(())
}
