//! Composite an overlay onto a photo with an explicit transform.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_model::transform::{OverlayTransform, TransformLimits, TransformModel};
use decal_render_engine::{ExportPipeline, ImageSource};

pub async fn run(
    config: &AppConfig,
    base: PathBuf,
    overlay: PathBuf,
    output: Option<PathBuf>,
    requested: OverlayTransform,
) -> anyhow::Result<()> {
    let mut model = TransformModel::new(TransformLimits::from_config(&config.engine));
    model
        .try_apply(&requested)
        .map_err(|e| anyhow::anyhow!("Invalid transform: {e}"))?;
    let transform = model.snapshot();
    if transform != requested {
        tracing::warn!(?requested, applied = ?transform, "Transform clamped into range");
    }

    println!("Compositing {} onto {}", overlay.display(), base.display());
    println!(
        "  Transform: x={:.2}% y={:.2}% scale={:.3} rotation={:.1}° opacity={:.2}",
        transform.x,
        transform.y,
        transform.scale,
        model.normalized_rotation(),
        transform.opacity
    );

    let pipeline = ExportPipeline::from_config(config);
    let artifact = pipeline
        .export_composite(
            &ImageSource::Path(base),
            &ImageSource::Path(overlay),
            transform,
            None,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;

    let written = super::write_artifact(&artifact, output)?;
    println!(
        "  Output: {} ({}x{}, {} bytes)",
        written.display(),
        artifact.size.width,
        artifact.size.height,
        artifact.bytes.len()
    );
    Ok(())
}
