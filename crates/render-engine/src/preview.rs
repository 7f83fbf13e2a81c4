//! Live preview placement.
//!
//! The preview does not re-composite pixels. It positions the overlay over
//! the displayed base image with a CSS-equivalent transform computed from
//! the same formulas the exporter uses, evaluated against the display
//! surface instead of the export raster.

use serde::Serialize;

use decal_common::error::DecalResult;
use decal_model::event::HitTarget;
use decal_model::geometry::{Point2D, RasterSize, SurfaceRect};
use decal_model::mapper::{device_to_local, percent_to_local};
use decal_model::transform::OverlayTransform;

use crate::compositor::{fold_rotation, overlay_draw_size};

/// Radius around a handle, in surface pixels, that still counts as a hit.
pub const HANDLE_HIT_RADIUS: f64 = 14.0;

/// Distance of the rotate handle past the overlay's right edge, measured in
/// the overlay's own frame. The handle sits at bearing `rotation` from the
/// center, so the rotate gesture keeps it under the pointer.
pub const ROTATE_HANDLE_OFFSET: f64 = 28.0;

/// Overlay placement on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewStyle {
    /// Overlay center, surface-local pixels.
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
}

impl PreviewStyle {
    /// Compute the preview placement for `transform` on `surface`.
    pub fn compute(
        surface: &SurfaceRect,
        overlay: RasterSize,
        transform: &OverlayTransform,
        reference_fraction: f64,
    ) -> DecalResult<Self> {
        let size = overlay_draw_size(surface.size(), overlay, transform.scale, reference_fraction)?;
        let center = percent_to_local(Point2D::new(transform.x, transform.y), surface.size());
        Ok(Self {
            left: center.x,
            top: center.y,
            width: size.width,
            height: size.height,
            rotation_deg: fold_rotation(transform.rotation),
            opacity: transform.opacity,
        })
    }

    /// Inline style for an absolutely positioned overlay element.
    pub fn to_css(&self) -> String {
        format!(
            "left: {:.3}px; top: {:.3}px; width: {:.3}px; height: {:.3}px; opacity: {:.3}; \
             transform: translate(-50%, -50%) rotate({:.3}deg);",
            self.left, self.top, self.width, self.height, self.opacity, self.rotation_deg
        )
    }

    /// Map a surface-local point into the overlay's unrotated frame, with
    /// the origin at the overlay center.
    fn to_overlay_frame(&self, local: Point2D) -> Point2D {
        let (sin, cos) = (-self.rotation_deg.to_radians()).sin_cos();
        let dx = local.x - self.left;
        let dy = local.y - self.top;
        Point2D::new(dx * cos - dy * sin, dx * sin + dy * cos)
    }

    fn from_overlay_frame(&self, p: Point2D) -> Point2D {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Point2D::new(
            p.x * cos - p.y * sin + self.left,
            p.x * sin + p.y * cos + self.top,
        )
    }

    /// Resize handle (bottom-right corner) in surface-local pixels.
    pub fn resize_handle(&self) -> Point2D {
        self.from_overlay_frame(Point2D::new(self.width / 2.0, self.height / 2.0))
    }

    /// Rotate handle (out from the right edge) in surface-local pixels.
    pub fn rotate_handle(&self) -> Point2D {
        self.from_overlay_frame(Point2D::new(self.width / 2.0 + ROTATE_HANDLE_OFFSET, 0.0))
    }

    /// Classify a device-pixel press on `surface`. Handles win over the body.
    pub fn hit_test(&self, device_point: Point2D, surface: &SurfaceRect) -> HitTarget {
        let local = device_to_local(device_point, surface.origin());
        if local.distance_to(&self.resize_handle()) <= HANDLE_HIT_RADIUS {
            return HitTarget::ResizeHandle;
        }
        if local.distance_to(&self.rotate_handle()) <= HANDLE_HIT_RADIUS {
            return HitTarget::RotateHandle;
        }
        let p = self.to_overlay_frame(local);
        if p.x.abs() <= self.width / 2.0 && p.y.abs() <= self.height / 2.0 {
            HitTarget::Body
        } else {
            HitTarget::Outside
        }
    }
}
