//! Artist statements
//!
//! A single extra turn after a drawing is finished: the provider is shown
//! the final image plus the artist's notes and asked for gallery prose.

use monet_llm::{DrawingProvider, DrawingRequest, DrawingResponse};

use crate::error::Result;
use crate::logger::SessionLogger;
use crate::prompt::{statement_prompt, FINISHED_ARTWORK_SUMMARY, STATEMENT_INSTRUCTION};

/// Statement file name inside a session directory
pub const STATEMENT_FILE_NAME: &str = "artist-statement.txt";

/// Ask `provider` for an artist statement about a finished canvas.
///
/// Returns the trimmed statement and the raw response for usage accounting.
pub async fn generate_artist_statement(
    provider: &dyn DrawingProvider,
    canvas_png_base64: &str,
    notes_history: &[String],
    original_prompt: &str,
    logger: &SessionLogger,
) -> Result<(String, DrawingResponse)> {
    let request = DrawingRequest {
        system_prompt: statement_prompt().to_string(),
        canvas_png_base64: canvas_png_base64.to_string(),
        original_prompt: original_prompt.to_string(),
        iteration: 0,
        layer_summary: FINISHED_ARTWORK_SUMMARY.to_string(),
        notes_history: notes_history.to_vec(),
        iteration_message: Some(STATEMENT_INSTRUCTION.to_string()),
        ..DrawingRequest::default()
    };

    logger.log("== Artist statement");
    let response = provider.send_drawing_request(&request).await?;
    logger.log_response(&response);

    let text = response.raw_text.trim().to_string();
    logger.log("");
    logger.log(&text);
    Ok((text, response))
}
