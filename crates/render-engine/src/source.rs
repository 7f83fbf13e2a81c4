//! Image resources and their decoded form.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tiny_skia::{Pixmap, PixmapRef};

use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::RasterSize;

use crate::canvas::pixmap_from_rgba;

/// An undecoded image resource.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// In-memory encoded bytes (e.g. an upload).
    Bytes { name: String, data: Arc<[u8]> },
    /// An encoded image file on disk.
    Path(PathBuf),
}

impl ImageSource {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Label used in logs and decode errors.
    pub fn name(&self) -> String {
        match self {
            Self::Bytes { name, .. } => name.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

/// A decoded, premultiplied raster with the name of the resource it came from.
#[derive(Clone)]
pub struct DecodedImage {
    pub name: String,
    pixmap: Pixmap,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("name", &self.name)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DecodedImage {
    /// Wrap a straight-alpha raster. Empty rasters are a `Decode` error.
    pub fn from_rgba(name: impl Into<String>, pixels: RgbaImage) -> DecalResult<Self> {
        let name = name.into();
        let pixmap =
            pixmap_from_rgba(pixels).ok_or_else(|| DecalError::decode(&name, "image has no pixels"))?;
        Ok(Self { name, pixmap })
    }

    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> RasterSize {
        RasterSize::new(self.width(), self.height())
    }
}

/// Decode encoded bytes into a premultiplied raster.
pub fn decode_bytes(name: &str, data: &[u8]) -> DecalResult<DecodedImage> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| DecalError::decode(name, e.to_string()))?
        .to_rgba8();
    DecodedImage::from_rgba(name, decoded)
}

/// Read only the header to get an image's pixel size.
pub async fn probe_size(source: &ImageSource) -> DecalResult<RasterSize> {
    let name = source.name();
    let source = source.clone();
    let task_name = name.clone();
    tokio::task::spawn_blocking(move || -> DecalResult<RasterSize> {
        let dimensions = match &source {
            ImageSource::Bytes { data, .. } => image::io::Reader::new(Cursor::new(&data[..]))
                .with_guessed_format()
                .map_err(|e| DecalError::decode(&task_name, e.to_string()))?
                .into_dimensions(),
            ImageSource::Path(path) => image::io::Reader::open(path)
                .map_err(|e| DecalError::decode(&task_name, e.to_string()))?
                .with_guessed_format()
                .map_err(|e| DecalError::decode(&task_name, e.to_string()))?
                .into_dimensions(),
        };
        let (width, height) = dimensions.map_err(|e| DecalError::decode(&task_name, e.to_string()))?;
        Ok(RasterSize::new(width, height))
    })
    .await
    .map_err(|e| DecalError::decode(&name, format!("probe task failed: {e}")))?
}

/// Decode a source off the async executor.
///
/// Unreadable files and corrupt data both surface as `Decode` errors.
pub async fn decode_source(source: &ImageSource) -> DecalResult<DecodedImage> {
    let name = source.name();
    let data: Arc<[u8]> = match source {
        ImageSource::Bytes { data, .. } => Arc::clone(data),
        ImageSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| DecalError::decode(&name, e.to_string()))?
            .into(),
    };

    let started = std::time::Instant::now();
    let task_name = name.clone();
    let decoded = tokio::task::spawn_blocking(move || decode_bytes(&task_name, &data))
        .await
        .map_err(|e| DecalError::decode(&name, format!("decode task failed: {e}")))??;

    tracing::debug!(
        source = %name,
        width = decoded.width(),
        height = decoded.height(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Decoded image"
    );
    Ok(decoded)
}
