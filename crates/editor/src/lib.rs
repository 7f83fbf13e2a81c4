//! Decal Editor
//!
//! Coordinates one editing session: the uploaded base image, the single
//! overlay transform it owns, the display surface geometry reported by the
//! host UI, the gesture controller, the live preview, and exports.

pub mod session;

pub use session::*;
