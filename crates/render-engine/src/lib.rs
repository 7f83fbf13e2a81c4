//! Decal Render Engine
//!
//! Paints the overlay onto the base photo and exports the flattened result.
//!
//! # Pipeline Architecture
//!
//! ```text
//! base bytes ────▶ decode ──▶ Canvas (base native size)
//!                                   │
//! overlay bytes ─▶ decode ──────────┤
//!                                   ├── clear
//! transform snapshot ───────────────┤   paint base
//!                                   │   translate ▶ rotate ▶ draw overlay
//!                                   ▼
//!                              encode (PNG) ──▶ ExportArtifact
//! ```
//!
//! The live preview uses [`preview::PreviewStyle`], which applies the same
//! sizing rules to the display surface instead of the export raster.

pub mod canvas;
pub mod compositor;
pub mod export;
pub mod preview;
pub mod source;

pub use export::*;
pub use source::{DecodedImage, ImageSource};
