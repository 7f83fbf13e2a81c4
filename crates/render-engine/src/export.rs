//! Export pipeline: decode both images, composite at the base image's
//! native resolution, and encode the result.

use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use decal_common::config::{AppConfig, ExportDefaults, OutputFormat};
use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::RasterSize;
use decal_model::transform::{OverlayTransform, TransformLimits};

use crate::canvas::Canvas;
use crate::compositor::{CompositeRenderer, OverlayPlacement};
use crate::source::{decode_source, ImageSource};

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    DecodingBase,
    DecodingOverlay,
    Compositing,
    Encoding,
    Complete,
}

impl ExportStage {
    fn progress(self) -> f64 {
        match self {
            Self::DecodingBase => 0.0,
            Self::DecodingOverlay => 0.25,
            Self::Compositing => 0.5,
            Self::Encoding => 0.75,
            Self::Complete => 1.0,
        }
    }
}

/// An encoded composite ready for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,

    /// Suggested download filename.
    pub file_name: String,

    /// Pixel size, equal to the base image's native size.
    pub size: RasterSize,

    pub format: OutputFormat,

    /// Where the overlay landed in the exported raster.
    pub placement: OverlayPlacement,
}

impl ExportArtifact {
    /// Write the bytes to `path`, or to `path/<file_name>` when `path` is an
    /// existing directory. Returns the file written.
    pub fn write_to(&self, path: &Path) -> DecalResult<PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&target, &self.bytes)?;
        Ok(target)
    }
}

/// Everything one export needs, captured at request time.
///
/// Owning its sources and a transform snapshot lets a job run while the
/// editor keeps mutating the live transform.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub base: ImageSource,
    pub overlay: ImageSource,
    pub transform: OverlayTransform,
}

/// Orchestrates decode, composite, and encode for one overlay asset.
///
/// Every call allocates its own destination raster, so concurrent exports
/// never share pixels.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    renderer: CompositeRenderer,
    limits: TransformLimits,
    defaults: ExportDefaults,
}

impl ExportPipeline {
    pub fn new(renderer: CompositeRenderer, limits: TransformLimits, defaults: ExportDefaults) -> Self {
        Self {
            renderer,
            limits,
            defaults,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            CompositeRenderer::new(&config.engine),
            TransformLimits::from_config(&config.engine),
            config.export.clone(),
        )
    }

    pub fn renderer(&self) -> &CompositeRenderer {
        &self.renderer
    }

    /// Run a captured export job.
    pub async fn run(
        &self,
        job: ExportJob,
        progress: Option<ProgressCallback>,
    ) -> DecalResult<ExportArtifact> {
        self.export_composite(&job.base, &job.overlay, job.transform, progress)
            .await
    }

    /// Composite `overlay` onto `base` with a snapshot of the transform.
    ///
    /// The snapshot is clamped into the configured limits first, so callers
    /// need not go through a `TransformModel`. Fails with `OutOfRangeInput`
    /// on non-finite fields and with `Decode` if either resource is
    /// unreadable; the overlay is never silently omitted.
    pub async fn export_composite(
        &self,
        base: &ImageSource,
        overlay: &ImageSource,
        transform: OverlayTransform,
        progress: Option<ProgressCallback>,
    ) -> DecalResult<ExportArtifact> {
        let transform = self.limits.clamp(&transform)?;
        tracing::info!(
            base = %base.name(),
            overlay = %overlay.name(),
            x = transform.x,
            y = transform.y,
            scale = transform.scale,
            rotation = transform.rotation,
            opacity = transform.opacity,
            "Starting export"
        );
        let report = |stage: ExportStage| {
            if let Some(cb) = &progress {
                cb(ExportProgress {
                    progress: stage.progress(),
                    stage,
                });
            }
        };

        report(ExportStage::DecodingBase);
        let base_image = decode_source(base).await?;
        let canvas = Canvas::new(base_image.width(), base_image.height())?;

        report(ExportStage::DecodingOverlay);
        let overlay_image = decode_source(overlay).await?;

        report(ExportStage::Compositing);
        let renderer = self.renderer;
        let (pixels, placement) = tokio::task::spawn_blocking(move || {
            let mut canvas = canvas;
            let placement = renderer.render(&mut canvas, &base_image, &overlay_image, &transform)?;
            Ok::<_, DecalError>((canvas.into_rgba(), placement))
        })
        .await
        .map_err(|e| DecalError::render(format!("composite task failed: {e}")))??;

        report(ExportStage::Encoding);
        let size = RasterSize::new(pixels.width(), pixels.height());
        let format = self.defaults.format;
        let bytes = tokio::task::spawn_blocking(move || encode(&pixels, format))
            .await
            .map_err(|e| DecalError::encode(format!("encode task failed: {e}")))??;

        report(ExportStage::Complete);
        tracing::info!(
            width = size.width,
            height = size.height,
            bytes = bytes.len(),
            file_name = %self.defaults.file_name,
            "Export complete"
        );

        Ok(ExportArtifact {
            bytes,
            file_name: self.defaults.file_name.clone(),
            size,
            format,
            placement,
        })
    }
}

/// Encode a raster in the requested format.
pub fn encode(pixels: &RgbaImage, format: OutputFormat) -> DecalResult<Vec<u8>> {
    match format {
        OutputFormat::Png => encode_png(pixels),
    }
}

fn encode_png(pixels: &RgbaImage) -> DecalResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ColorType::Rgba8,
        )
        .map_err(|e| DecalError::encode(e.to_string()))?;
    Ok(out)
}
