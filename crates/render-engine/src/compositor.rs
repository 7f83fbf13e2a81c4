//! Frame compositor: paints the base photo and the transformed overlay
//! into a destination canvas.
//!
//! Paint order is fixed: clear, base, then overlay via
//! translate -> rotate -> draw centered. Scale is baked into the overlay's
//! draw size so rotation always acts on the already-sized overlay.

use decal_common::config::EngineConfig;
use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::{Point2D, RasterSize, Size2D};
use decal_model::mapper::percent_to_raster_pixels;
use decal_model::transform::OverlayTransform;

use crate::canvas::Canvas;
use crate::source::DecodedImage;

/// Where and how large the overlay lands on a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    /// Overlay center in destination pixels.
    pub center: Point2D,
    /// Drawn width in destination pixels (scale included).
    pub width: f64,
    /// Drawn height in destination pixels.
    pub height: f64,
    /// Rotation in degrees, folded into `[0, 360)`.
    pub rotation_deg: f64,
    pub opacity: f64,
}

/// Overlay draw size for a destination of `dest` pixels.
///
/// The nominal width is a fixed fraction of the destination's shorter side,
/// so the overlay keeps the same proportions whatever the destination's
/// resolution. Height follows the overlay's own aspect ratio.
pub fn overlay_draw_size(
    dest: Size2D,
    overlay: RasterSize,
    scale: f64,
    reference_fraction: f64,
) -> DecalResult<Size2D> {
    let aspect = overlay
        .aspect_ratio()
        .ok_or_else(|| DecalError::render("overlay image has no pixels"))?;
    if !dest.is_valid() {
        return Err(DecalError::invalid_geometry(format!(
            "destination is {}x{}",
            dest.width, dest.height
        )));
    }
    let width = dest.min_side() * reference_fraction * scale;
    Ok(Size2D::new(width, width / aspect))
}

/// Rotation folded into `[0, 360)`. Keeps renders byte-identical for
/// rotations that differ by whole turns.
pub fn fold_rotation(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Paints composites using the configured overlay reference size.
#[derive(Debug, Clone, Copy)]
pub struct CompositeRenderer {
    reference_fraction: f64,
}

impl CompositeRenderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            reference_fraction: config.overlay_reference_fraction,
        }
    }

    pub fn reference_fraction(&self) -> f64 {
        self.reference_fraction
    }

    /// Compute the overlay placement for a destination raster.
    pub fn placement(
        &self,
        dest: RasterSize,
        overlay: RasterSize,
        transform: &OverlayTransform,
    ) -> DecalResult<OverlayPlacement> {
        let size = overlay_draw_size(dest.as_size(), overlay, transform.scale, self.reference_fraction)?;
        Ok(OverlayPlacement {
            center: percent_to_raster_pixels(Point2D::new(transform.x, transform.y), dest),
            width: size.width,
            height: size.height,
            rotation_deg: fold_rotation(transform.rotation),
            opacity: transform.opacity,
        })
    }

    /// Paint `base` and `overlay` into `dest`.
    ///
    /// The canvas's paint state is the same after the call as before it.
    pub fn render(
        &self,
        dest: &mut Canvas,
        base: &DecodedImage,
        overlay: &DecodedImage,
        transform: &OverlayTransform,
    ) -> DecalResult<OverlayPlacement> {
        let dest_size = dest.size();
        let placement = self.placement(dest_size, overlay.size(), transform)?;

        dest.clear();
        dest.draw_image(
            base.pixmap(),
            0.0,
            0.0,
            dest_size.width as f32,
            dest_size.height as f32,
        );

        let (width, height) = (placement.width as f32, placement.height as f32);
        dest.save();
        dest.translate(placement.center.x as f32, placement.center.y as f32);
        dest.rotate(placement.rotation_deg as f32);
        dest.set_global_alpha(placement.opacity as f32);
        dest.draw_image(overlay.pixmap(), -width / 2.0, -height / 2.0, width, height);
        dest.restore();

        tracing::trace!(
            base = %base.name,
            overlay = %overlay.name,
            cx = placement.center.x,
            cy = placement.center.y,
            width = placement.width,
            height = placement.height,
            "Composited overlay"
        );
        Ok(placement)
    }
}
