//! Input event types for scripted editing sessions.
//!
//! Events are stored as JSONL, one timestamped event per line. Pointer
//! coordinates are device pixels, the same space the host UI reports.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2D, SurfaceRect};

/// Milliseconds since the session started.
pub type TimestampMs = u64;

/// Which part of the overlay a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    /// The overlay image itself.
    Body,
    /// The corner handle that scales the overlay.
    ResizeHandle,
    /// The handle that rotates the overlay.
    RotateHandle,
    /// Anywhere that is not part of the overlay.
    Outside,
}

/// A single input event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    #[serde(flatten)]
    pub kind: EventKind,
}

/// Discriminated union of event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Mouse button or touch pressed.
    PointerDown { target: HitTarget, x: f64, y: f64 },

    /// Pointer or touch moved.
    PointerMove { x: f64, y: f64 },

    /// Mouse button or touch released.
    PointerUp,

    /// The platform aborted the pointer sequence.
    PointerCancel,

    /// The display surface was re-measured.
    SurfaceResized {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },

    /// The display surface went away (container unmounted).
    SurfaceLost,

    /// Opacity slider changed.
    SetOpacity { value: f64 },

    /// Reset button pressed.
    Reset,
}

impl InputEvent {
    pub fn pointer_down(timestamp_ms: TimestampMs, target: HitTarget, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::PointerDown { target, x, y },
        }
    }

    pub fn pointer_move(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::PointerMove { x, y },
        }
    }

    pub fn pointer_up(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::PointerUp,
        }
    }

    pub fn surface_resized(timestamp_ms: TimestampMs, rect: SurfaceRect) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::SurfaceResized {
                left: rect.left,
                top: rect.top,
                width: rect.width,
                height: rect.height,
            },
        }
    }

    /// Extract the device-pixel pointer position if this event carries one.
    pub fn pointer_position(&self) -> Option<Point2D> {
        match &self.kind {
            EventKind::PointerDown { x, y, .. } | EventKind::PointerMove { x, y } => {
                Some(Point2D::new(*x, *y))
            }
            _ => None,
        }
    }
}

/// Parse events from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_events(jsonl: &str) -> Result<Vec<InputEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize events to JSONL format.
pub fn serialize_events(events: &[InputEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
