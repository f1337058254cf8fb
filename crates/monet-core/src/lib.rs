//! Monet Core - Drawing Session Engine
//!
//! This crate provides the iteration/session state machine for Monet:
//! - Parser: Extracting drawing directives from model output
//! - Prompt: System prompts, planning and statement instructions
//! - Logger: The per-session artist log
//! - Session: Mutable state of one drawing run and its token totals
//! - Driver: Planning, bounded iteration, validation and rollback
//! - Statement: Artist statements for finished pieces
//! - Studio: Registry of interactive, tool-driven sessions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod logger;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod statement;
pub mod studio;

pub use driver::{DriverConfig, SessionDriver, SessionOutcome, StopReason, FINAL_PNG, FINAL_SVG};
pub use error::{Error, Result};
pub use logger::{SessionLogger, LOG_FILE_NAME};
pub use parser::{parse_response, ArtistStatus, ParsedResponse};
pub use session::{DrawingSession, SessionPhase, UsageTotals, DEFAULT_MAX_ITERATIONS};
pub use statement::{generate_artist_statement, STATEMENT_FILE_NAME};
pub use studio::{SessionId, Studio, StudioReply, StudioSessionInfo};
