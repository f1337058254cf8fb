//! `monet draw`

use crate::app::{make_provider, AppConfig};
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use monet_canvas::{session_dir, ResvgRasterizer, SvgCanvas};
use monet_core::{DrawingSession, SessionDriver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Arguments for `monet draw`
#[derive(Args, Debug)]
pub struct DrawArgs {
    /// What to draw
    pub prompt: String,

    /// LLM provider
    #[arg(short, long, value_parser = ["anthropic", "gemini"])]
    pub provider: Option<String>,

    /// Model name override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum drawing iterations
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Canvas width
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height
    #[arg(long)]
    pub height: Option<u32>,

    /// Background color
    #[arg(long)]
    pub background: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable extended thinking
    #[arg(long)]
    pub thinking: bool,

    /// Extended thinking budget in tokens
    #[arg(long)]
    pub thinking_budget: Option<u32>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run one drawing session and print the final SVG path
pub async fn run(args: DrawArgs, config: &AppConfig) -> Result<()> {
    let drawing = &config.drawing;

    let width = args.width.unwrap_or(config.canvas.width);
    let height = args.height.unwrap_or(config.canvas.height);
    if width == 0 || height == 0 {
        bail!("Canvas size must be positive, got {width}x{height}");
    }
    let background = args
        .background
        .unwrap_or_else(|| config.canvas.background.clone());

    let provider_name = args.provider.as_deref().unwrap_or(&drawing.provider);
    let model = args.model.as_deref().or(drawing.model.as_deref());
    let provider = make_provider(provider_name, model)?;

    let output_dir = args.output.unwrap_or_else(|| {
        session_dir(Path::new(&drawing.output_root), &args.prompt, Local::now())
    });

    let mut session = DrawingSession::new(
        args.prompt,
        SvgCanvas::new(width, height, background),
        output_dir,
    )
    .with_max_iterations(args.max_iterations.unwrap_or(drawing.max_iterations))
    .with_thinking(
        args.thinking || drawing.thinking_enabled,
        args.thinking_budget.unwrap_or(drawing.thinking_budget),
    );

    let driver = SessionDriver::new(
        provider,
        Arc::new(ResvgRasterizer::new()),
        drawing.driver_config(args.verbose)?,
    );
    let outcome = driver
        .run(&mut session)
        .await
        .context("Drawing session failed")?;

    info!(
        reason = %outcome.stop_reason,
        iterations = outcome.iterations,
        usage = %session.usage(),
        "Done"
    );
    println!("Final SVG: {}", outcome.final_svg.display());
    Ok(())
}
