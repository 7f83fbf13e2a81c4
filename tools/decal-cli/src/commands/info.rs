//! Show image information and the default overlay placement.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_model::transform::TransformLimits;
use decal_render_engine::source::probe_size;
use decal_render_engine::{ExportPipeline, ImageSource};

pub async fn run(
    config: &AppConfig,
    image: PathBuf,
    overlay: Option<PathBuf>,
) -> anyhow::Result<()> {
    let size = probe_size(&ImageSource::Path(image.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Image: {}", image.display());
    println!("  Size: {}x{}", size.width, size.height);
    if let Some(ratio) = size.aspect_ratio() {
        println!("  Aspect ratio: {ratio:.4}");
    }

    let Some(overlay) = overlay else {
        return Ok(());
    };
    let overlay_size = probe_size(&ImageSource::Path(overlay.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let defaults = TransformLimits::from_config(&config.engine).defaults();
    let placement = ExportPipeline::from_config(config)
        .renderer()
        .placement(size, overlay_size, &defaults)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Overlay: {}", overlay.display());
    println!("  Size: {}x{}", overlay_size.width, overlay_size.height);
    println!(
        "  Default placement: center=({:.1}, {:.1}) size={:.1}x{:.1} opacity={:.2}",
        placement.center.x, placement.center.y, placement.width, placement.height, placement.opacity
    );
    println!(
        "  Scale range: {}..{}",
        config.engine.min_scale, config.engine.max_scale
    );
    Ok(())
}
