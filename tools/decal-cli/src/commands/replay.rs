//! Replay a recorded gesture script, then export the result.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_editor::{EditorSession, TracingListener};
use decal_model::event::parse_events;
use decal_model::geometry::SurfaceRect;
use decal_render_engine::source::probe_size;
use decal_render_engine::{ExportProgress, ImageSource};

pub struct ReplayArgs {
    pub base: PathBuf,
    pub overlay: PathBuf,
    pub script: PathBuf,
    pub output: Option<PathBuf>,
    pub surface_width: Option<f64>,
    pub surface_height: Option<f64>,
    pub surface_left: f64,
    pub surface_top: f64,
    pub dry_run: bool,
}

pub async fn run(config: AppConfig, args: ReplayArgs) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.script)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", args.script.display()))?;
    let events = parse_events(&content)
        .map_err(|e| anyhow::anyhow!("Invalid gesture script {}: {e}", args.script.display()))?;

    let mut session =
        EditorSession::open_with_listener(config, ImageSource::Path(args.overlay), TracingListener)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load overlay: {e}"))?;

    // The photo's own size stands in for a 1:1 on-screen display unless the
    // caller says otherwise. Only the header is read here.
    let base = ImageSource::Path(args.base);
    let native = probe_size(&base)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load base image: {e}"))?;
    let surface = SurfaceRect::new(
        args.surface_left,
        args.surface_top,
        args.surface_width.unwrap_or(native.width as f64),
        args.surface_height.unwrap_or(native.height as f64),
    );
    session
        .load_base_image(base, surface)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load base image: {e}"))?;

    println!("Replaying {} events from {}", events.len(), args.script.display());
    for event in &events {
        session.apply(event);
    }
    if session.gesture_state().is_active() {
        tracing::warn!("Script ended mid-gesture; releasing");
        session.pointer_up();
    }

    let transform = session.snapshot();
    println!("{}", serde_json::to_string_pretty(&transform)?);

    if args.dry_run {
        return Ok(());
    }

    let progress: Box<dyn Fn(ExportProgress) + Send + Sync> = Box::new(|p| {
        tracing::debug!(stage = ?p.stage, progress = p.progress, "Export progress");
    });
    let artifact = session
        .export(Some(progress))
        .await
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;
    let written = super::write_artifact(&artifact, args.output)?;
    println!("Export complete: {}", written.display());
    Ok(())
}
