//! Session Driver
//!
//! The drawing loop. One planning turn, then up to `max_iterations` drawing
//! turns. Every canvas mutation requested by the model is applied
//! speculatively and re-rendered; a mutation that breaks rendering is
//! rolled back on the spot.
//!
//! ```text
//! Planning ──► Iterating(1..=max) ──► Terminated
//!                 │  done / max / empty streak
//!                 │  preview or provider failure
//! ```

use monet_canvas::{
    iteration_stem, render_base64, save_png, save_svg, Rasterizer, DEFAULT_EXPORT_SCALE,
};
use monet_llm::{DrawingProvider, DrawingRequest, DEFAULT_MAX_OUTPUT_TOKENS};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::logger::SessionLogger;
use crate::parser::{parse_response, ArtistStatus, ParsedResponse};
use crate::prompt::{system_prompt, PLANNING_INSTRUCTION};
use crate::session::{DrawingSession, SessionPhase};

/// Final document name
pub const FINAL_SVG: &str = "final.svg";

/// Final high-resolution raster name
pub const FINAL_PNG: &str = "final.png";

/// Default number of empty turns tolerated before stopping
pub const DEFAULT_MAX_EMPTY_STREAK: u32 = 3;

/// Driver settings that are not part of the session itself
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Output token budget per turn
    pub max_output_tokens: u32,
    /// Scale of the final raster export
    pub export_scale: f32,
    /// Consecutive empty turns before the session stops
    pub max_empty_streak: u32,
    /// Mirror the artist log to the operator stream
    pub verbose: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            export_scale: DEFAULT_EXPORT_SCALE,
            max_empty_streak: DEFAULT_MAX_EMPTY_STREAK,
            verbose: false,
        }
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model set `<status>done</status>`
    ArtistDone,
    /// The iteration budget ran out
    MaxIterations,
    /// Too many consecutive turns without an applied directive
    EmptyStreak,
    /// The current canvas could not be rendered for the next request
    PreviewFailed,
    /// The provider call failed
    ProviderFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ArtistDone => "artist signaled done",
            Self::MaxIterations => "reached max iterations",
            Self::EmptyStreak => "too many consecutive iterations with no new content",
            Self::PreviewFailed => "canvas preview failed to render",
            Self::ProviderFailed => "provider request failed",
        };
        f.write_str(text)
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Path of `final.svg`
    pub final_svg: PathBuf,
    /// Path of `final.png` when the export succeeded
    pub final_png: Option<PathBuf>,
    /// Why the loop ended
    pub stop_reason: StopReason,
    /// Drawing turns started
    pub iterations: u32,
}

/// Runs drawing sessions against a provider and a rasterizer
pub struct SessionDriver {
    provider: Arc<dyn DrawingProvider>,
    rasterizer: Arc<dyn Rasterizer>,
    config: DriverConfig,
}

impl SessionDriver {
    /// Create a driver
    pub fn new(
        provider: Arc<dyn DrawingProvider>,
        rasterizer: Arc<dyn Rasterizer>,
        config: DriverConfig,
    ) -> Self {
        Self {
            provider,
            rasterizer,
            config,
        }
    }

    /// Driver settings
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run `session` to completion.
    ///
    /// Only failing to create the output directory or to write `final.svg`
    /// is an error; every other failure ends the loop or is logged.
    #[instrument(
        skip(self, session),
        fields(provider = self.provider.name(), max_iterations = session.max_iterations)
    )]
    pub async fn run(&self, session: &mut DrawingSession) -> Result<SessionOutcome> {
        fs::create_dir_all(&session.output_dir)?;

        let logger = SessionLogger::new(session.log_path(), self.config.verbose);
        logger.session_header(
            &session.prompt,
            self.provider.name(),
            self.provider.default_model(),
            &session.canvas,
            session.max_iterations,
            session.thinking_enabled.then_some(session.thinking_budget),
        );

        let system_prompt = system_prompt(
            session.canvas.width,
            session.canvas.height,
            session.max_iterations,
        );

        session.phase = SessionPhase::Planning;
        self.plan(session, &logger, &system_prompt).await;

        session.phase = SessionPhase::Iterating;
        let stop_reason = self.iterate(session, &logger, &system_prompt).await;

        session.phase = SessionPhase::Terminated;
        self.finish(session, &logger, stop_reason)
    }

    fn build_request(
        &self,
        session: &DrawingSession,
        system_prompt: &str,
        canvas_png_base64: String,
        iteration_message: Option<String>,
        thinking_enabled: bool,
    ) -> DrawingRequest {
        DrawingRequest {
            system_prompt: system_prompt.to_string(),
            canvas_png_base64,
            original_prompt: session.prompt.clone(),
            iteration: session.iteration,
            layer_summary: session.canvas.layer_summary(),
            notes_history: session.notes_history.clone(),
            max_output_tokens: self.config.max_output_tokens,
            iteration_message,
            thinking_enabled,
            thinking_budget: session.thinking_budget,
        }
    }

    /// Iteration 0: ask for a plan with reasoning on. Never touches the canvas.
    async fn plan(
        &self,
        session: &mut DrawingSession,
        logger: &SessionLogger,
        system_prompt: &str,
    ) {
        logger.planning_marker();

        let preview = match render_base64(self.rasterizer.as_ref(), &session.canvas.to_svg()) {
            Ok(preview) => preview,
            Err(e) => {
                logger.warn(format!("Planning skipped, canvas preview failed: {e}"));
                return;
            }
        };

        let request = self.build_request(
            session,
            system_prompt,
            preview,
            Some(PLANNING_INSTRUCTION.to_string()),
            true,
        );
        let response = match self.provider.send_drawing_request(&request).await {
            Ok(response) => response,
            Err(e) => {
                logger.warn(format!("Planning request failed, continuing without a plan: {e}"));
                return;
            }
        };

        session.usage.add(&response);
        logger.log_response(&response);

        let parsed = parse_response(&response.raw_text);
        if parsed.has_canvas_directive() {
            logger.warn("Planning response contained drawing directives; discarded");
        }
        if parsed.notes.is_empty() {
            logger.warn("Planning response had no notes");
            return;
        }

        let plan = format!("[Plan]\n{}", parsed.notes);
        logger.log("");
        logger.log(&plan);
        logger.log("");
        session.notes_history.insert(0, plan);
        info!("Plan recorded");
    }

    async fn iterate(
        &self,
        session: &mut DrawingSession,
        logger: &SessionLogger,
        system_prompt: &str,
    ) -> StopReason {
        for n in 1..=session.max_iterations {
            session.iteration = n;
            logger.iteration_marker(n);
            info!(iteration = n, "Starting iteration");

            let preview = match render_base64(self.rasterizer.as_ref(), &session.canvas.to_svg()) {
                Ok(preview) => preview,
                Err(e) => {
                    logger.warn(format!("Failed to render canvas preview: {e}"));
                    return StopReason::PreviewFailed;
                }
            };

            let request = self.build_request(
                session,
                system_prompt,
                preview,
                None,
                session.thinking_enabled,
            );
            let response = match self.provider.send_drawing_request(&request).await {
                Ok(response) => response,
                Err(e) => {
                    logger.warn(format!("Provider request failed: {e}"));
                    return StopReason::ProviderFailed;
                }
            };

            session.usage.add(&response);
            logger.log_response(&response);

            let parsed = parse_response(&response.raw_text);
            logger.log_parsed(&parsed);
            if !parsed.notes.is_empty() {
                session.notes_history.push(parsed.notes.clone());
            }

            self.apply(session, &parsed, logger);

            if session.empty_streak >= self.config.max_empty_streak {
                logger.warn(format!(
                    "{} consecutive iterations with no new content, stopping",
                    session.empty_streak
                ));
                return StopReason::EmptyStreak;
            }

            self.save_iteration(session, logger);

            if parsed.status == ArtistStatus::Done {
                logger.log("Artist signaled done.");
                return StopReason::ArtistDone;
            }
        }

        logger.log(format!("Reached max iterations ({}).", session.max_iterations));
        StopReason::MaxIterations
    }

    /// Apply directives in order: background, replacement, new layer
    fn apply(&self, session: &mut DrawingSession, parsed: &ParsedResponse, logger: &SessionLogger) {
        if let Some(background) = &parsed.background {
            session.canvas.set_background(background.clone());
            logger.log(format!("Background changed to {background}"));
        }

        if let (Some(layer_id), Some(elements)) =
            (&parsed.replace_layer_id, &parsed.replace_elements)
        {
            if !elements.is_empty() {
                self.replace_layer(session, layer_id, elements, logger);
            }
        }

        if !parsed.svg_elements.is_empty() {
            let defs = (!parsed.defs_elements.is_empty()).then_some(parsed.defs_elements.as_str());
            let layer_id = session.canvas.add_layer(&parsed.svg_elements, defs);

            match self.rasterizer.render(&session.canvas.to_svg(), 1.0) {
                Ok(_) => {
                    logger.log(format!("Added {layer_id}"));
                    session.empty_streak = 0;
                }
                Err(e) => {
                    session.canvas.remove_layer(&layer_id);
                    session.empty_streak += 1;
                    logger.warn(format!("{layer_id} caused a render error, removed: {e}"));
                }
            }
        } else if parsed.replace_layer_id.is_none() {
            session.empty_streak += 1;
            warn!(streak = session.empty_streak, "No SVG elements in response");
        } else {
            session.empty_streak = 0;
        }
    }

    fn replace_layer(
        &self,
        session: &mut DrawingSession,
        layer_id: &str,
        elements: &str,
        logger: &SessionLogger,
    ) {
        let Some(previous) = session.canvas.layer(layer_id).cloned() else {
            logger.warn(format!("Cannot replace {layer_id}: not found"));
            return;
        };
        if let Err(e) = session.canvas.replace_layer(layer_id, elements, None) {
            logger.warn(format!("Cannot replace {layer_id}: {e}"));
            return;
        }

        match self.rasterizer.render(&session.canvas.to_svg(), 1.0) {
            Ok(_) => logger.log(format!("Replaced {layer_id}")),
            Err(e) => {
                logger.warn(format!(
                    "Replacing {layer_id} caused a render error, previous content restored: {e}"
                ));
                if let Err(e) = session.canvas.restore_layer(previous) {
                    logger.warn(format!("Could not restore {layer_id}: {e}"));
                }
            }
        }
    }

    fn save_iteration(&self, session: &DrawingSession, logger: &SessionLogger) {
        let stem = iteration_stem(session.iteration);
        let svg = session.canvas.to_svg();

        let svg_path = session.output_dir.join(format!("{stem}.svg"));
        if let Err(e) = save_svg(&svg_path, &svg) {
            logger.warn(format!("Could not save {stem}.svg: {e}"));
        }

        let png_path = session.output_dir.join(format!("{stem}.png"));
        if let Err(e) = self
            .rasterizer
            .render(&svg, 1.0)
            .and_then(|png| save_png(&png_path, &png))
        {
            logger.warn(format!("Could not save intermediate PNG: {e}"));
        }
    }

    fn finish(
        &self,
        session: &DrawingSession,
        logger: &SessionLogger,
        stop_reason: StopReason,
    ) -> Result<SessionOutcome> {
        let svg = session.canvas.to_svg();
        let final_svg = session.output_dir.join(FINAL_SVG);
        let saved = save_svg(&final_svg, &svg);
        if let Err(e) = &saved {
            logger.warn(format!("Could not save {FINAL_SVG}: {e}"));
        }

        let png_path = session.output_dir.join(FINAL_PNG);
        let final_png = match self
            .rasterizer
            .render(&svg, self.config.export_scale)
            .and_then(|png| save_png(&png_path, &png))
        {
            Ok(()) => Some(png_path),
            Err(e) => {
                logger.warn(format!("Could not save final PNG: {e}"));
                None
            }
        };

        logger.session_footer(
            session.iteration,
            &session.canvas.layer_summary(),
            &session.usage,
            stop_reason,
        );
        info!(
            iterations = session.iteration,
            reason = %stop_reason,
            usage = %session.usage,
            output = %session.output_dir.display(),
            "Drawing session finished"
        );

        saved?;
        Ok(SessionOutcome {
            final_svg,
            final_png,
            stop_reason,
            iterations: session.iteration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UsageTotals;
    use mockall::mock;
    use monet_canvas::SvgCanvas;
    use monet_llm::{DrawingResponse, MockProvider};
    use tempfile::TempDir;

    mock! {
        Raster {}

        impl Rasterizer for Raster {
            fn render(&self, svg: &str, scale: f32) -> monet_canvas::Result<Vec<u8>>;
        }
    }

    const PLAN: &str = "<notes>Sky, then sea, then a boat.</notes>";
    const BROKEN: &str = "data-broken";

    /// Fails on any document containing the `data-broken` marker
    fn rasterizer() -> Arc<dyn Rasterizer> {
        let mut raster = MockRaster::new();
        raster.expect_render().returning(|svg, _| {
            if svg.contains(BROKEN) {
                Err(monet_canvas::Error::render("simulated parse failure"))
            } else {
                Ok(b"\x89PNG".to_vec())
            }
        });
        Arc::new(raster)
    }

    fn failing_rasterizer() -> Arc<dyn Rasterizer> {
        let mut raster = MockRaster::new();
        raster
            .expect_render()
            .returning(|_, _| Err(monet_canvas::Error::render("renderer offline")));
        Arc::new(raster)
    }

    /// A mock whose first answer is the plan, followed by `turns`
    fn scripted(turns: &[&str]) -> MockProvider {
        let mock = MockProvider::new();
        mock.add_response(DrawingResponse::text(PLAN));
        for turn in turns {
            mock.add_response(DrawingResponse::text(*turn));
        }
        mock
    }

    fn session(dir: &TempDir, max_iterations: u32) -> DrawingSession {
        DrawingSession::new("a boat at sea", SvgCanvas::default(), dir.path().join("run"))
            .with_max_iterations(max_iterations)
    }

    fn driver(provider: &MockProvider, rasterizer: Arc<dyn Rasterizer>) -> SessionDriver {
        SessionDriver::new(Arc::new(provider.clone()), rasterizer, DriverConfig::default())
    }

    fn layer(n: u32, status: &str) -> String {
        format!(
            r#"<notes>step {n}</notes><svg-elements><rect id="r{n}" width="10" height="10"/></svg-elements><status>{status}</status>"#
        )
    }

    #[tokio::test]
    async fn test_single_turn_done() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[
            r#"<svg-elements><circle cx="5" cy="5" r="5"/></svg-elements><status>done</status>"#,
        ]);
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ArtistDone);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(session.iteration(), 1);
        assert_eq!(session.canvas.layer_ids(), vec!["layer-1"]);
        assert_eq!(session.phase(), SessionPhase::Terminated);

        let final_svg = fs::read_to_string(&outcome.final_svg).unwrap();
        assert!(final_svg.contains(r#"<circle cx="5" cy="5" r="5"/>"#));
        assert_eq!(outcome.final_png, Some(session.output_dir.join(FINAL_PNG)));
        assert!(session.output_dir.join("iter-001.svg").exists());
        assert!(session.output_dir.join("iter-001.png").exists());
    }

    #[tokio::test]
    async fn test_three_layers_in_order() {
        let dir = TempDir::new().unwrap();
        let turns = [layer(1, "continue"), layer(2, "continue"), layer(3, "done")];
        let provider = scripted(&turns.iter().map(String::as_str).collect::<Vec<_>>());
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ArtistDone);
        assert_eq!(session.iteration(), 3);
        assert_eq!(session.canvas.layer_ids(), vec!["layer-1", "layer-2", "layer-3"]);

        let svg = session.canvas.to_svg();
        let first = svg.find(r#"id="r1""#).unwrap();
        let third = svg.find(r#"id="r3""#).unwrap();
        assert!(first < third);
    }

    #[tokio::test]
    async fn test_stops_at_max_iterations() {
        let dir = TempDir::new().unwrap();
        let turns: Vec<String> = (1..=5).map(|n| layer(n, "continue")).collect();
        let provider = scripted(&turns.iter().map(String::as_str).collect::<Vec<_>>());
        let mut session = session(&dir, 3);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::MaxIterations);
        assert_eq!(outcome.iterations, 3);
        // plan + three drawing turns
        assert_eq!(provider.request_count(), 4);
    }

    #[tokio::test]
    async fn test_render_failure_rolls_back_layer() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[&format!(
            r#"<defs><filter id="iter1-f"/></defs><svg-elements><rect {BROKEN}="1"/></svg-elements>"#
        )]);
        let mut session = session(&dir, 1);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::MaxIterations);
        assert_eq!(session.iteration(), 1);
        assert_eq!(session.empty_streak(), 1);
        assert!(session.canvas.is_empty());
        assert!(!session.canvas.to_svg().contains("iter1-f"));

        let log = fs::read_to_string(session.log_path()).unwrap();
        assert!(log.contains("layer-1 caused a render error, removed"));
    }

    #[tokio::test]
    async fn test_rolled_back_id_not_reused() {
        let dir = TempDir::new().unwrap();
        let broken = format!(r#"<svg-elements><rect {BROKEN}="1"/></svg-elements>"#);
        let good = layer(2, "done");
        let provider = scripted(&[&broken, &good]);
        let mut session = session(&dir, 5);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(session.canvas.layer_ids(), vec!["layer-2"]);
        assert_eq!(session.empty_streak(), 0);
    }

    #[tokio::test]
    async fn test_empty_streak_stops_session() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[
            "<notes>hmm</notes>",
            "no tags at all",
            "<notes>still thinking</notes><status>continue</status>",
            &layer(4, "continue"),
        ]);
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::EmptyStreak);
        assert_eq!(session.iteration(), 3);
        assert!(session.canvas.is_empty());
        // no intermediate artifacts for the stopping turn
        assert!(!session.output_dir.join("iter-003.svg").exists());

        let log = fs::read_to_string(session.log_path()).unwrap();
        assert!(log.contains("3 consecutive iterations with no new content, stopping"));
        assert!(log.contains("== Finished: too many consecutive iterations"));
    }

    #[tokio::test]
    async fn test_usage_totals_are_exact_sums() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new();
        provider.add_response(
            DrawingResponse::text(PLAN)
                .with_tokens(7, 3)
                .with_thinking_tokens(11),
        );
        provider.add_response(
            DrawingResponse::text(layer(1, "continue"))
                .with_tokens(100, 40)
                .with_cache_tokens(0, 90),
        );
        provider.add_response(
            DrawingResponse::text(layer(2, "done"))
                .with_tokens(120, 50)
                .with_cache_tokens(90, 10)
                .with_thinking_tokens(5),
        );
        let mut session = session(&dir, 10);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(
            *session.usage(),
            UsageTotals {
                input_tokens: 227,
                output_tokens: 93,
                cache_read_tokens: 90,
                cache_creation_tokens: 100,
                thinking_tokens: 16,
            }
        );
    }

    #[tokio::test]
    async fn test_planning_request_and_note() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[&layer(1, "done")]);
        let mut session = session(&dir, 10);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].iteration, 0);
        assert!(requests[0].thinking_enabled);
        assert_eq!(requests[0].iteration_message.as_deref(), Some(PLANNING_INSTRUCTION));

        assert_eq!(requests[1].iteration, 1);
        assert!(!requests[1].thinking_enabled);
        assert!(requests[1].iteration_message.is_none());
        assert_eq!(requests[1].notes_history, vec!["[Plan]\nSky, then sea, then a boat."]);

        assert_eq!(
            session.notes_history(),
            ["[Plan]\nSky, then sea, then a boat.", "step 1"]
        );
    }

    #[tokio::test]
    async fn test_planning_markup_discarded() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::with_texts([
            "<notes>plan</notes><svg-elements><rect/></svg-elements><background>#000</background>",
            "<replace-layer id=\"layer-9\"><rect/></replace-layer><status>done</status>",
        ]);
        let mut session = session(&dir, 10);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert!(session.canvas.is_empty());
        assert_eq!(session.canvas.background, "#FFFFFF");
        let log = fs::read_to_string(session.log_path()).unwrap();
        assert!(log.contains("Planning response contained drawing directives; discarded"));
        assert!(log.contains("Cannot replace layer-9: not found"));
    }

    #[tokio::test]
    async fn test_planning_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new();
        provider.add_error(monet_llm::Error::RateLimit);
        provider.add_response(DrawingResponse::text(layer(1, "done")));
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ArtistDone);
        assert_eq!(session.notes_history(), ["step 1"]);
    }

    #[tokio::test]
    async fn test_provider_failure_stops_session() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[&layer(1, "continue")]);
        provider.add_error(monet_llm::Error::Network("connection reset".to_string()));
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ProviderFailed);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(session.canvas.len(), 1);
        let final_svg = fs::read_to_string(&outcome.final_svg).unwrap();
        assert!(final_svg.contains(r#"id="r1""#));
    }

    #[tokio::test]
    async fn test_preview_failure_stops_session() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[&layer(1, "done")]);
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, failing_rasterizer())
            .run(&mut session)
            .await
            .unwrap();

        assert_eq!(outcome.stop_reason, StopReason::PreviewFailed);
        assert_eq!(provider.request_count(), 0);
        assert!(outcome.final_svg.exists());
        assert!(outcome.final_png.is_none());
    }

    #[tokio::test]
    async fn test_replace_layer_applied() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[
            &layer(1, "continue"),
            r#"<replace-layer id="layer-1"><ellipse rx="3" ry="2"/></replace-layer><status>done</status>"#,
        ]);
        let mut session = session(&dir, 10);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        let layer = session.canvas.layer("layer-1").unwrap();
        assert_eq!(layer.elements, r#"<ellipse rx="3" ry="2"/>"#);
        assert_eq!(session.empty_streak(), 0);
    }

    #[tokio::test]
    async fn test_replace_only_turn_resets_empty_streak() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&[
            &layer(1, "continue"),
            "<notes>looking</notes>",
            "<notes>still looking</notes>",
            r#"<replace-layer id="layer-1"><circle r="4"/></replace-layer><status>done</status>"#,
        ]);
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ArtistDone);
        assert_eq!(session.iteration(), 4);
        assert_eq!(session.empty_streak(), 0);
        assert_eq!(session.canvas.layer("layer-1").unwrap().elements, r#"<circle r="4"/>"#);
    }

    #[tokio::test]
    async fn test_replace_render_failure_restores_layer() {
        let dir = TempDir::new().unwrap();
        let replace = format!(
            r#"<replace-layer id="layer-1"><rect {BROKEN}="1"/></replace-layer><status>done</status>"#
        );
        let provider = scripted(&[&layer(1, "continue"), &replace]);
        let mut session = session(&dir, 10);

        let outcome = driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::ArtistDone);
        let layer = session.canvas.layer("layer-1").unwrap();
        assert!(layer.elements.contains(r#"id="r1""#));
    }

    #[tokio::test]
    async fn test_background_directive() {
        let dir = TempDir::new().unwrap();
        let provider = scripted(&["<background>#1a1a2e</background><status>done</status>"]);
        let mut session = session(&dir, 10);

        driver(&provider, rasterizer()).run(&mut session).await.unwrap();

        assert_eq!(session.canvas.background, "#1a1a2e");
        assert_eq!(session.empty_streak(), 1);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::ArtistDone.to_string(), "artist signaled done");
        assert_eq!(StopReason::MaxIterations.to_string(), "reached max iterations");
    }
}
