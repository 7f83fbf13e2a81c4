//! Coordinate conversions between device pixels, surface-local pixels,
//! percentages of the display surface, and destination raster pixels.
//!
//! All functions are pure. Percentages use the `[0.0, 100.0]` range.

use decal_common::error::{DecalError, DecalResult};

use crate::geometry::{Point2D, RasterSize, Size2D};

/// Convert a device-pixel point to the display surface's own pixel space.
pub fn device_to_local(device: Point2D, surface_origin: Point2D) -> Point2D {
    device - surface_origin
}

/// Convert a surface-local point to percentages of the surface size.
///
/// Each component saturates at `[0, 100]` so pointers dragged past the
/// surface edge pin the overlay to that edge. Fails with
/// `InvalidGeometry` when the surface has no area.
pub fn local_to_percent(local: Point2D, surface: Size2D) -> DecalResult<Point2D> {
    if !surface.is_valid() {
        return Err(DecalError::invalid_geometry(format!(
            "display surface is {}x{}",
            surface.width, surface.height
        )));
    }
    Ok(Point2D::new(
        (local.x / surface.width * 100.0).clamp(0.0, 100.0),
        (local.y / surface.height * 100.0).clamp(0.0, 100.0),
    ))
}

/// Convert a percentage point back to surface-local pixels.
pub fn percent_to_local(percent: Point2D, surface: Size2D) -> Point2D {
    scale_percent(percent, surface)
}

/// Convert a percentage point to pixels of a destination raster.
///
/// Same formula as [`percent_to_local`], but evaluated against the export
/// raster rather than the on-screen surface; this keeps the preview and the
/// exported image in agreement when their pixel sizes differ.
pub fn percent_to_raster_pixels(percent: Point2D, raster: RasterSize) -> Point2D {
    scale_percent(percent, raster.as_size())
}

fn scale_percent(percent: Point2D, size: Size2D) -> Point2D {
    Point2D::new(
        percent.x / 100.0 * size.width,
        percent.y / 100.0 * size.height,
    )
}
