//! CLI module for Monet
//!
//! Provides the commands:
//! - `draw`: Run a drawing session for an art prompt
//! - `statement`: Write an artist's statement for a finished session
//!
//! A first argument that is neither a subcommand nor a flag is taken as a
//! prompt for `draw`, so `monet "a red fox"` starts a drawing.

use crate::app::AppConfig;
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;

pub mod draw;
pub mod statement;

/// Monet CLI
#[derive(Parser, Debug)]
#[command(name = "monet")]
#[command(about = "LLM-powered iterative SVG art generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse process arguments, defaulting a bare prompt to `draw`
    pub fn parse_args() -> Self {
        Self::parse_from(with_default_command(std::env::args_os()))
    }

    /// Whether the chosen command asked for verbose output
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Commands::Draw(args)) => args.verbose,
            Some(Commands::Statement(args)) => args.verbose,
            None => false,
        }
    }
}

/// Insert `draw` before a first argument that is not a subcommand or flag
pub fn with_default_command<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let insert = match args.get(1).and_then(|arg| arg.to_str()) {
        Some(first) => !first.starts_with('-') && !is_subcommand(first),
        None => false,
    };
    if insert {
        args.insert(1, OsString::from("draw"));
    }
    args
}

fn is_subcommand(name: &str) -> bool {
    name == "help"
        || Cli::command()
            .get_subcommands()
            .any(|cmd| cmd.get_name() == name || cmd.get_all_aliases().any(|a| a == name))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create art with an LLM from an art PROMPT
    Draw(draw::DrawArgs),
    /// Generate an artist's statement for a finished artwork in OUTPUT_DIR
    Statement(statement::StatementArgs),
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Draw(args)) => draw::run(args, &config).await,
        Some(Commands::Statement(args)) => statement::run(args, &config).await,
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
