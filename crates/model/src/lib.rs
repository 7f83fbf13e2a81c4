//! Decal Model
//!
//! Defines the core data contracts for the overlay editor:
//! - **Geometry:** Points, surface rectangles, and raster sizes
//! - **Transform:** The clamped five-field overlay placement
//! - **Mapper:** Conversions between device, surface-local, percentage,
//!   and raster pixel spaces
//! - **Events:** Timestamped pointer/surface events for scripted sessions
//!
//! Overlay position is stored as a percentage `[0.0, 100.0]` of the display
//! surface so it survives the preview and the export having different
//! pixel dimensions.

pub mod event;
pub mod geometry;
pub mod mapper;
pub mod transform;

pub use event::*;
pub use geometry::*;
pub use transform::*;
