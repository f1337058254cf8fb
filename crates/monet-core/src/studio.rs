//! Interactive Studio
//!
//! A registry of tool-driven drawing sessions. Instead of running the
//! driver loop, a host lets a model call these operations directly; every
//! call names its session by handle and replies with text plus a fresh PNG
//! of the canvas.
//!
//! Edits are validated the same way the driver validates them: apply,
//! re-render, and roll back with an explicit error when rendering fails.

use chrono::{DateTime, Local, Utc};
use monet_canvas::{
    iteration_stem, save_png, save_svg, session_dir, Rasterizer, SvgCanvas, DEFAULT_EXPORT_SCALE,
};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::driver::{FINAL_PNG, FINAL_SVG};
use crate::error::{Error, Result};
use crate::logger::{SessionLogger, LOG_FILE_NAME};
use crate::prompt::{statement_prompt, studio_intro};
use crate::statement::STATEMENT_FILE_NAME;

/// Opaque handle of a studio session
pub type SessionId = Uuid;

const RULE: &str = "========================================";

/// Text plus the rendered canvas returned by every studio call
#[derive(Debug, Clone)]
pub struct StudioReply {
    /// Message for the calling model
    pub text: String,
    /// PNG of the canvas after the call
    pub png: Vec<u8>,
}

/// Summary of a registered session
#[derive(Debug, Clone)]
pub struct StudioSessionInfo {
    /// Session handle
    pub id: SessionId,
    /// Art prompt
    pub prompt: String,
    /// Artifact directory
    pub output_dir: PathBuf,
    /// Layers added so far
    pub iteration: u32,
    /// Whether the drawing is finished
    pub finished: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

struct StudioSession {
    id: SessionId,
    prompt: String,
    canvas: SvgCanvas,
    output_dir: PathBuf,
    iteration: u32,
    finished: bool,
    logger: SessionLogger,
    created_at: DateTime<Utc>,
}

impl StudioSession {
    fn info(&self) -> StudioSessionInfo {
        StudioSessionInfo {
            id: self.id,
            prompt: self.prompt.clone(),
            output_dir: self.output_dir.clone(),
            iteration: self.iteration,
            finished: self.finished,
            created_at: self.created_at,
        }
    }
}

/// Registry of interactive drawing sessions
pub struct Studio {
    root: PathBuf,
    rasterizer: Arc<dyn Rasterizer>,
    export_scale: f32,
    sessions: RwLock<HashMap<SessionId, StudioSession>>,
}

impl Studio {
    /// Create a studio writing session directories under `root`
    pub fn new(root: impl Into<PathBuf>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            root: root.into(),
            rasterizer,
            export_scale: DEFAULT_EXPORT_SCALE,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Set the scale of the final raster export
    #[must_use]
    pub fn with_export_scale(mut self, scale: f32) -> Self {
        self.export_scale = scale;
        self
    }

    /// Start a new drawing session on a blank canvas
    pub async fn create_canvas(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        background: &str,
    ) -> Result<(SessionId, StudioReply)> {
        if width == 0 || height == 0 {
            return Err(Error::Configuration(format!(
                "canvas size must be positive, got {width}x{height}"
            )));
        }

        let id = Uuid::new_v4();
        let output_dir = unique_dir(session_dir(&self.root, prompt, Local::now()), id);
        fs::create_dir_all(&output_dir)?;

        let canvas = SvgCanvas::new(width, height, background);
        let png = self.rasterizer.render(&canvas.to_svg(), 1.0)?;

        let logger = SessionLogger::new(output_dir.join(LOG_FILE_NAME), false);
        logger.log(format!("Prompt: {prompt}"));
        logger.log(format!("Canvas: {width}x{height}, bg={background}"));
        logger.log(format!("Output: {}", output_dir.display()));
        logger.log("");

        info!(session = %id, output = %output_dir.display(), "Studio session created");
        let session = StudioSession {
            id,
            prompt: prompt.to_string(),
            canvas,
            output_dir,
            iteration: 0,
            finished: false,
            logger,
            created_at: Utc::now(),
        };
        self.sessions.write().await.insert(id, session);

        Ok((
            id,
            StudioReply {
                text: studio_intro(prompt, width, height),
                png,
            },
        ))
    }

    /// Add a new layer on top; rolled back when it breaks rendering
    pub async fn add_layer(
        &self,
        id: SessionId,
        elements: &str,
        defs: Option<&str>,
    ) -> Result<StudioReply> {
        let mut sessions = self.sessions.write().await;
        let session = mutable_session(&mut sessions, id)?;

        session.iteration += 1;
        session.logger.log(RULE);
        session
            .logger
            .log(format!("== add_layer (iteration {})", session.iteration));

        let layer_id = session.canvas.add_layer(elements, defs);
        let png = match self.rasterizer.render(&session.canvas.to_svg(), 1.0) {
            Ok(png) => png,
            Err(e) => {
                session.canvas.remove_layer(&layer_id);
                session.iteration -= 1;
                session.logger.log(format!("ROLLED BACK {layer_id}: {e}"));
                return Err(Error::RenderRejected {
                    layer_id,
                    message: e.to_string(),
                });
            }
        };

        session.logger.log(format!("Added {layer_id}"));
        self.save_intermediates(session);

        Ok(StudioReply {
            text: format!(
                "Added {layer_id}. Layers: {}",
                session.canvas.layer_summary()
            ),
            png,
        })
    }

    /// Replace an existing layer; the previous content comes back on render failure
    pub async fn replace_layer(
        &self,
        id: SessionId,
        layer_id: &str,
        elements: &str,
        defs: Option<&str>,
    ) -> Result<StudioReply> {
        let mut sessions = self.sessions.write().await;
        let session = mutable_session(&mut sessions, id)?;

        session.logger.log(format!("== replace_layer {layer_id}"));
        let previous = session
            .canvas
            .layer(layer_id)
            .cloned()
            .ok_or_else(|| monet_canvas::Error::LayerNotFound(layer_id.to_string()))?;
        session.canvas.replace_layer(layer_id, elements, defs)?;

        let png = match self.rasterizer.render(&session.canvas.to_svg(), 1.0) {
            Ok(png) => png,
            Err(e) => {
                session.canvas.restore_layer(previous)?;
                session
                    .logger
                    .log(format!("ROLLED BACK replace {layer_id}: {e}"));
                return Err(Error::RenderRejected {
                    layer_id: layer_id.to_string(),
                    message: e.to_string(),
                });
            }
        };

        session.logger.log(format!("Replaced {layer_id}"));
        self.save_intermediates(session);

        Ok(StudioReply {
            text: format!(
                "Replaced {layer_id}. Layers: {}",
                session.canvas.layer_summary()
            ),
            png,
        })
    }

    /// Change the background color
    pub async fn set_background(&self, id: SessionId, color: &str) -> Result<StudioReply> {
        let mut sessions = self.sessions.write().await;
        let session = mutable_session(&mut sessions, id)?;

        session.canvas.set_background(color);
        session.logger.log(format!("Background changed to {color}"));

        let png = self.rasterizer.render(&session.canvas.to_svg(), 1.0)?;
        Ok(StudioReply {
            text: format!("Background set to {color}."),
            png,
        })
    }

    /// Current canvas without changes; also works on finished drawings
    pub async fn view_canvas(&self, id: SessionId) -> Result<StudioReply> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(Error::SessionNotFound(id))?;

        let mut text = format!(
            "Canvas {}x{}, bg={}\nLayers: {}",
            session.canvas.width,
            session.canvas.height,
            session.canvas.background,
            session.canvas.layer_summary()
        );
        if session.finished {
            text.push_str("\n(Drawing is finished)");
        }

        let png = self.rasterizer.render(&session.canvas.to_svg(), 1.0)?;
        Ok(StudioReply { text, png })
    }

    /// Save the final artifacts and freeze the session
    pub async fn finish_drawing(&self, id: SessionId) -> Result<StudioReply> {
        let mut sessions = self.sessions.write().await;
        let session = mutable_session(&mut sessions, id)?;

        let svg = session.canvas.to_svg();
        save_svg(&session.output_dir.join(FINAL_SVG), &svg)?;
        let png = self.rasterizer.render(&svg, self.export_scale)?;
        save_png(&session.output_dir.join(FINAL_PNG), &png)?;
        session.finished = true;

        let summary = session.canvas.layer_summary();
        session.logger.log("");
        session.logger.log(RULE);
        session.logger.log("== Drawing finished");
        session
            .logger
            .log(format!("Iterations: {}", session.iteration));
        session.logger.log(format!("Layers: {summary}"));
        session
            .logger
            .log(format!("Output: {}", session.output_dir.display()));
        info!(session = %id, iterations = session.iteration, "Studio drawing finished");

        Ok(StudioReply {
            text: format!(
                "Drawing complete! Saved to {}\nIterations: {}\nLayers: {summary}\n\n\
## Artist Statement\n\n{}\n\n\
Please write an artist's statement for this piece, then call \
`save_artist_statement` with the text.",
                session.output_dir.display(),
                session.iteration,
                statement_prompt(),
            ),
            png,
        })
    }

    /// Write `artist-statement.txt` for a finished drawing
    pub async fn save_artist_statement(&self, id: SessionId, statement: &str) -> Result<PathBuf> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(Error::SessionNotFound(id))?;
        if !session.finished {
            return Err(Error::SessionNotFinished(id));
        }

        let path = session.output_dir.join(STATEMENT_FILE_NAME);
        fs::write(&path, statement)?;
        session.logger.log(format!(
            "Artist statement saved ({} chars)",
            statement.chars().count()
        ));
        Ok(path)
    }

    /// Look up one session
    pub async fn session_info(&self, id: SessionId) -> Result<StudioSessionInfo> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(StudioSession::info)
            .ok_or(Error::SessionNotFound(id))
    }

    /// All registered sessions, oldest first
    pub async fn list_sessions(&self) -> Vec<StudioSessionInfo> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<_> = sessions.values().map(StudioSession::info).collect();
        list.sort_by_key(|s| s.created_at);
        list
    }

    fn save_intermediates(&self, session: &StudioSession) {
        let stem = iteration_stem(session.iteration);
        let svg = session.canvas.to_svg();
        if let Err(e) = save_svg(&session.output_dir.join(format!("{stem}.svg")), &svg) {
            session.logger.log(format!("WARNING: Could not save {stem}.svg: {e}"));
        }
        if let Err(e) = self
            .rasterizer
            .render(&svg, 1.0)
            .and_then(|png| save_png(&session.output_dir.join(format!("{stem}.png")), &png))
        {
            session
                .logger
                .log(format!("WARNING: Could not save intermediate PNG: {e}"));
        }
        debug!(session = %session.id, %stem, "Saved intermediates");
    }
}

fn mutable_session(
    sessions: &mut HashMap<SessionId, StudioSession>,
    id: SessionId,
) -> Result<&mut StudioSession> {
    let session = sessions.get_mut(&id).ok_or(Error::SessionNotFound(id))?;
    if session.finished {
        return Err(Error::SessionFinished(id));
    }
    Ok(session)
}

/// Disambiguate two sessions started for the same prompt in the same second
fn unique_dir(dir: PathBuf, id: SessionId) -> PathBuf {
    if !dir.exists() {
        return dir;
    }
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = id.simple().to_string();
    dir.with_file_name(format!("{name}-{}", &suffix[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use monet_canvas::ResvgRasterizer;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn studio(dir: &TempDir) -> Studio {
        Studio::new(dir.path(), Arc::new(ResvgRasterizer::without_fonts()))
    }

    #[tokio::test]
    async fn test_create_canvas() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);

        let (id, reply) = studio
            .create_canvas("a lighthouse", 200, 100, "#112233")
            .await
            .unwrap();

        assert!(reply.text.starts_with("# Drawing Session: a lighthouse"));
        assert!(reply.png.starts_with(PNG_MAGIC));

        let info = studio.session_info(id).await.unwrap();
        assert_eq!(info.iteration, 0);
        assert!(!info.finished);
        let log = fs::read_to_string(info.output_dir.join(LOG_FILE_NAME)).unwrap();
        assert!(log.starts_with("Prompt: a lighthouse\nCanvas: 200x100, bg=#112233\n"));
    }

    #[tokio::test]
    async fn test_create_canvas_rejects_zero_size() {
        let dir = TempDir::new().unwrap();
        let result = studio(&dir).create_canvas("x", 0, 100, "#fff").await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_same_prompt_gets_distinct_dirs() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let (a, _) = studio.create_canvas("twin", 10, 10, "#fff").await.unwrap();
        let (b, _) = studio.create_canvas("twin", 10, 10, "#fff").await.unwrap();

        let a = studio.session_info(a).await.unwrap();
        let b = studio.session_info(b).await.unwrap();
        assert_ne!(a.output_dir, b.output_dir);
        assert_eq!(studio.list_sessions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_add_layer_saves_intermediates() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let (id, _) = studio.create_canvas("sun", 100, 100, "#fff").await.unwrap();

        let reply = studio
            .add_layer(id, r#"<circle cx="50" cy="50" r="20" fill="orange"/>"#, None)
            .await
            .unwrap();

        assert_eq!(reply.text, "Added layer-1. Layers: layer-1: ~1 elements");
        let info = studio.session_info(id).await.unwrap();
        assert_eq!(info.iteration, 1);
        assert!(info.output_dir.join("iter-001.svg").exists());
        assert!(info.output_dir.join("iter-001.png").exists());
    }

    #[tokio::test]
    async fn test_add_layer_render_failure_rolls_back() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let (id, _) = studio.create_canvas("sun", 100, 100, "#fff").await.unwrap();

        let err = studio
            .add_layer(id, r#"<circle cx="50" cy="50" r="20""#, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RenderRejected { ref layer_id, .. } if layer_id == "layer-1"));

        let info = studio.session_info(id).await.unwrap();
        assert_eq!(info.iteration, 0);

        let reply = studio
            .add_layer(id, r#"<rect width="5" height="5"/>"#, None)
            .await
            .unwrap();
        assert!(reply.text.starts_with("Added layer-2."));
    }

    #[tokio::test]
    async fn test_replace_layer() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let (id, _) = studio.create_canvas("sea", 100, 100, "#fff").await.unwrap();
        studio
            .add_layer(id, r#"<rect width="5" height="5"/>"#, None)
            .await
            .unwrap();

        let missing = studio
            .replace_layer(id, "layer-7", "<rect/>", None)
            .await
            .unwrap_err();
        assert!(matches!(
            missing,
            Error::Canvas(monet_canvas::Error::LayerNotFound(_))
        ));

        let broken = studio
            .replace_layer(id, "layer-1", "<rect", None)
            .await
            .unwrap_err();
        assert!(matches!(broken, Error::RenderRejected { .. }));
        let view = studio.view_canvas(id).await.unwrap();
        assert!(view.text.contains("layer-1: ~1 elements"));

        let reply = studio
            .replace_layer(id, "layer-1", "<rect width=\"9\" height=\"9\"/><circle r=\"2\"/>", None)
            .await
            .unwrap();
        assert_eq!(reply.text, "Replaced layer-1. Layers: layer-1: ~2 elements");
    }

    #[tokio::test]
    async fn test_finish_and_statement() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let (id, _) = studio.create_canvas("moon", 50, 40, "#000").await.unwrap();
        studio.set_background(id, "#001").await.unwrap();

        let early = studio.save_artist_statement(id, "too soon").await;
        assert!(matches!(early, Err(Error::SessionNotFinished(_))));

        let reply = studio.finish_drawing(id).await.unwrap();
        assert!(reply.text.contains("## Artist Statement"));
        assert!(reply.text.contains("save_artist_statement"));

        let info = studio.session_info(id).await.unwrap();
        assert!(info.finished);
        assert!(info.output_dir.join(FINAL_SVG).exists());
        assert!(info.output_dir.join(FINAL_PNG).exists());

        let blocked = studio.add_layer(id, "<rect/>", None).await;
        assert!(matches!(blocked, Err(Error::SessionFinished(_))));
        let again = studio.finish_drawing(id).await;
        assert!(matches!(again, Err(Error::SessionFinished(_))));

        let view = studio.view_canvas(id).await.unwrap();
        assert!(view.text.ends_with("(Drawing is finished)"));

        let path = studio
            .save_artist_statement(id, "A pale moon over nothing.")
            .await
            .unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "A pale moon over nothing."
        );
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);
        let id = Uuid::new_v4();

        assert!(matches!(
            studio.view_canvas(id).await,
            Err(Error::SessionNotFound(_))
        ));
        assert!(matches!(
            studio.set_background(id, "#fff").await,
            Err(Error::SessionNotFound(_))
        ));
    }
}
