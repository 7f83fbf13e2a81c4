//! A small immediate-mode paint surface over a `tiny_skia::Pixmap`.
//!
//! Covers the subset of a 2D canvas the compositor needs: a current
//! transform and global alpha, a save/restore stack, and `draw_image`.
//! Pixels are premultiplied while on the canvas; conversion to straight
//! alpha `RgbaImage` happens only when decoding and encoding.

use image::RgbaImage;
use tiny_skia::{
    BlendMode, Color, FilterQuality, IntSize, Pixmap, PixmapPaint, PixmapRef, Transform,
};

use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::RasterSize;

/// Saved paint state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintState {
    pub transform: Transform,
    pub global_alpha: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            global_alpha: 1.0,
        }
    }
}

/// Destination pixmap plus its paint state.
#[derive(Clone)]
pub struct Canvas {
    pixmap: Pixmap,
    state: PaintState,
    saved: Vec<PaintState>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("state", &self.state)
            .field("saved", &self.saved.len())
            .finish()
    }
}

impl Canvas {
    /// A fully transparent canvas. Zero-sized canvases are rejected.
    pub fn new(width: u32, height: u32) -> DecalResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            DecalError::render(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        Ok(Self {
            pixmap,
            state: PaintState::default(),
            saved: Vec::new(),
        })
    }

    pub fn size(&self) -> RasterSize {
        RasterSize::new(self.pixmap.width(), self.pixmap.height())
    }

    pub fn state(&self) -> &PaintState {
        &self.state
    }

    /// Number of states currently saved.
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the canvas.
    pub fn to_rgba(&self) -> RgbaImage {
        rgba_from_pixmap(self.pixmap.as_ref())
    }

    pub fn into_rgba(self) -> RgbaImage {
        rgba_from_pixmap(self.pixmap.as_ref())
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn save(&mut self) {
        self.saved.push(self.state);
    }

    /// Pop the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    /// Rotate clockwise (y points down) by `degrees` around the current origin.
    pub fn rotate(&mut self, degrees: f32) {
        self.state.transform = self.state.transform.pre_rotate(degrees);
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    /// Draw `src` into the user-space rectangle `(dx, dy, dw, dh)` through
    /// the current transform, bilinear-filtered and blended source-over at
    /// the global alpha.
    pub fn draw_image(&mut self, src: PixmapRef<'_>, dx: f32, dy: f32, dw: f32, dh: f32) {
        if !(dw > 0.0) || !(dh > 0.0) || self.state.global_alpha <= 0.0 {
            return;
        }
        let transform = self
            .state
            .transform
            .pre_translate(dx, dy)
            .pre_scale(dw / src.width() as f32, dh / src.height() as f32);
        let paint = PixmapPaint {
            opacity: self.state.global_alpha,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(0, 0, src, &paint, transform, None);
    }
}

/// Premultiply a straight-alpha raster into a pixmap. `None` for empty images.
pub fn pixmap_from_rgba(image: RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = image.into_raw();
    premultiply_in_place(&mut data);
    Pixmap::from_vec(data, size)
}

/// Demultiply a pixmap back into a straight-alpha raster.
pub fn rgba_from_pixmap(pixmap: PixmapRef<'_>) -> RgbaImage {
    let mut data = pixmap.data().to_vec();
    demultiply_in_place(&mut data);
    // Length always matches width * height * 4.
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).unwrap_or_default()
}

fn premultiply_in_place(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(4) {
        let alpha = pixel[3] as u16;
        for channel in &mut pixel[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
}

fn demultiply_in_place(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(4) {
        let alpha = pixel[3] as u16;
        if alpha == 0 {
            pixel[..3].fill(0);
            continue;
        }
        for channel in &mut pixel[..3] {
            *channel = ((*channel as u16 * 255 + alpha / 2) / alpha).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Pixmap {
        pixmap_from_rgba(RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
    }

    fn assert_close(actual: &Rgba<u8>, expected: [u8; 4]) {
        let off = actual
            .0
            .iter()
            .zip(expected)
            .any(|(a, e)| (*a as i16 - e as i16).abs() > 1);
        assert!(!off, "pixel {:?} is not close to {:?}", actual.0, expected);
    }

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(3, 2).is_ok());
    }

    #[test]
    fn test_save_restore_round_trips_state() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.save();
        canvas.translate(2.0, 2.0);
        canvas.rotate(57.0);
        canvas.set_global_alpha(0.3);
        assert_eq!(canvas.save_depth(), 1);
        canvas.restore();
        assert_eq!(canvas.save_depth(), 0);
        assert_eq!(*canvas.state(), PaintState::default());
        canvas.restore();
        assert_eq!(*canvas.state(), PaintState::default());
    }

    #[test]
    fn test_identity_draw_copies_opaque_pixels() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        src.put_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let pixmap = pixmap_from_rgba(src.clone()).unwrap();

        let mut canvas = Canvas::new(3, 2).unwrap();
        canvas.draw_image(pixmap.as_ref(), 0.0, 0.0, 3.0, 2.0);
        let out = canvas.to_rgba();
        for (x, y, px) in src.enumerate_pixels() {
            assert_close(out.get_pixel(x, y), px.0);
        }
    }

    #[test]
    fn test_global_alpha_blends_over_opaque() {
        let mut canvas = Canvas::new(1, 1).unwrap();
        canvas.draw_image(solid(1, 1, [0, 0, 200, 255]).as_ref(), 0.0, 0.0, 1.0, 1.0);
        canvas.set_global_alpha(0.5);
        canvas.draw_image(solid(1, 1, [200, 0, 0, 255]).as_ref(), 0.0, 0.0, 1.0, 1.0);
        assert_close(canvas.to_rgba().get_pixel(0, 0), [100, 0, 100, 255]);
    }

    #[test]
    fn test_translate_then_rotate_pivots_on_translated_origin() {
        let mut canvas = Canvas::new(20, 20).unwrap();
        canvas.translate(10.0, 10.0);
        canvas.rotate(90.0);
        // (0..4, 0..2) in user space lands at x 8..10, y 10..14.
        canvas.draw_image(solid(1, 1, [9, 9, 9, 255]).as_ref(), 0.0, 0.0, 4.0, 2.0);
        let out = canvas.to_rgba();
        assert_close(out.get_pixel(9, 12), [9, 9, 9, 255]);
        assert_eq!(out.get_pixel(12, 9)[3], 0);
    }

    #[test]
    fn test_draw_outside_canvas_is_clipped() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let src = solid(2, 2, [9, 9, 9, 255]);
        canvas.draw_image(src.as_ref(), -10.0, -10.0, 2.0, 2.0);
        canvas.draw_image(src.as_ref(), 3.0, 3.0, 4.0, 4.0);
        let out = canvas.to_rgba();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_close(out.get_pixel(3, 3), [9, 9, 9, 255]);
    }

    #[test]
    fn test_premultiply_round_trip_keeps_translucent_color_close() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 128]));
        let back = rgba_from_pixmap(pixmap_from_rgba(src).unwrap().as_ref());
        assert_close(back.get_pixel(1, 1), [200, 100, 50, 128]);
    }

    #[test]
    fn test_clear_resets_to_transparent() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        canvas.draw_image(solid(1, 1, [5, 5, 5, 255]).as_ref(), 0.0, 0.0, 2.0, 2.0);
        canvas.clear();
        assert!(canvas.to_rgba().pixels().all(|px| px.0 == [0, 0, 0, 0]));
    }
}
