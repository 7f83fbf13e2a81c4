//! Gesture state machine and per-mode update rules.

use decal_common::config::EngineConfig;
use decal_model::event::HitTarget;
use decal_model::geometry::{Point2D, SurfaceRect};
use decal_model::mapper::{device_to_local, local_to_percent, percent_to_local};
use decal_model::transform::TransformModel;

use crate::{MoveListener, NoopListener};

/// Kind of an in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureMode {
    Drag,
    Resize,
    Rotate,
}

impl GestureMode {
    pub fn from_target(target: HitTarget) -> Option<Self> {
        match target {
            HitTarget::Body => Some(Self::Drag),
            HitTarget::ResizeHandle => Some(Self::Resize),
            HitTarget::RotateHandle => Some(Self::Rotate),
            HitTarget::Outside => None,
        }
    }
}

/// Controller state. Active states carry the device point where the
/// gesture began; move handling never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging { anchor: Point2D },
    Resizing { anchor: Point2D },
    Rotating { anchor: Point2D },
}

impl GestureState {
    fn enter(mode: GestureMode, anchor: Point2D) -> Self {
        match mode {
            GestureMode::Drag => Self::Dragging { anchor },
            GestureMode::Resize => Self::Resizing { anchor },
            GestureMode::Rotate => Self::Rotating { anchor },
        }
    }

    pub fn mode(&self) -> Option<GestureMode> {
        match self {
            Self::Idle => None,
            Self::Dragging { .. } => Some(GestureMode::Drag),
            Self::Resizing { .. } => Some(GestureMode::Resize),
            Self::Rotating { .. } => Some(GestureMode::Rotate),
        }
    }

    pub fn anchor(&self) -> Option<Point2D> {
        match self {
            Self::Idle => None,
            Self::Dragging { anchor } | Self::Resizing { anchor } | Self::Rotating { anchor } => {
                Some(*anchor)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Result of feeding one pointer move to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No gesture is in progress.
    Idle,
    /// The mode's update rule ran against the model.
    Applied(GestureMode),
    /// The surface has no usable area; the model was left untouched.
    InvalidGeometry,
}

/// Drives the transform model from pointer input.
///
/// The controller holds no copy of the model or surface. Both are passed in
/// on every call so each move is computed from the live values.
#[derive(Debug)]
pub struct GestureController<L: MoveListener = NoopListener> {
    state: GestureState,
    listener: L,
    resize_calibration: f64,
}

impl GestureController<NoopListener> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_listener(config, NoopListener)
    }
}

impl<L: MoveListener> GestureController<L> {
    pub fn with_listener(config: &EngineConfig, listener: L) -> Self {
        Self {
            state: GestureState::Idle,
            listener,
            resize_calibration: config.resize_calibration,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Start a gesture if `target` is part of the overlay.
    ///
    /// Requires a mounted display surface; without one the press is ignored.
    /// A press while another gesture is active is also ignored.
    pub fn pointer_down(
        &mut self,
        target: HitTarget,
        device_point: Point2D,
        surface: Option<&SurfaceRect>,
    ) -> GestureState {
        if self.state.is_active() {
            tracing::debug!(state = ?self.state, "Ignoring pointer down during active gesture");
            return self.state;
        }
        let Some(mode) = GestureMode::from_target(target) else {
            return self.state;
        };
        if surface.is_none() {
            tracing::warn!(?mode, "Pointer down without a display surface");
            return self.state;
        }

        self.state = GestureState::enter(mode, device_point);
        self.listener.attach();
        tracing::debug!(?mode, x = device_point.x, y = device_point.y, "Gesture started");
        self.state
    }

    /// Apply the active mode's update rule for the pointer at `device_point`.
    pub fn pointer_move(
        &mut self,
        device_point: Point2D,
        surface: &SurfaceRect,
        model: &mut TransformModel,
    ) -> MoveOutcome {
        let Some(mode) = self.state.mode() else {
            return MoveOutcome::Idle;
        };
        if !surface.is_valid() || !device_point.is_finite() {
            tracing::warn!(?mode, ?surface, "Skipping gesture move on invalid geometry");
            return MoveOutcome::InvalidGeometry;
        }

        let local = device_to_local(device_point, surface.origin());
        match mode {
            GestureMode::Drag => match local_to_percent(local, surface.size()) {
                Ok(pct) => model.set_position(pct.x, pct.y),
                Err(_) => return MoveOutcome::InvalidGeometry,
            },
            GestureMode::Resize => {
                let scale = resize_scale(
                    local,
                    overlay_center(surface, model),
                    surface,
                    self.resize_calibration,
                    model.limits().min_scale,
                );
                model.set_scale(scale);
            }
            GestureMode::Rotate => {
                model.set_rotation_degrees(bearing_degrees(overlay_center(surface, model), local));
            }
        }
        MoveOutcome::Applied(mode)
    }

    /// End the gesture normally.
    pub fn pointer_up(&mut self) {
        self.finish("pointer up");
    }

    /// The platform aborted the gesture. The model keeps the last applied move.
    pub fn pointer_cancel(&mut self) {
        self.finish("pointer cancel");
    }

    /// The display surface was unmounted mid-gesture.
    pub fn surface_lost(&mut self) {
        self.finish("surface lost");
    }

    fn finish(&mut self, reason: &'static str) {
        if let Some(mode) = self.state.mode() {
            self.listener.detach();
            self.state = GestureState::Idle;
            tracing::debug!(?mode, reason, "Gesture ended");
        }
    }
}

/// The overlay's current center in surface-local pixels, derived from the
/// live model.
fn overlay_center(surface: &SurfaceRect, model: &TransformModel) -> Point2D {
    percent_to_local(Point2D::new(model.x(), model.y()), surface.size())
}

/// Scale implied by a handle at `local`, relative to the calibration radius.
/// A zero distance yields `min_scale`; the model clamps the upper bound.
fn resize_scale(
    local: Point2D,
    center: Point2D,
    surface: &SurfaceRect,
    calibration: f64,
    min_scale: f64,
) -> f64 {
    let distance = local.distance_to(&center);
    let base_distance = surface.size().min_side() * calibration;
    if distance <= 0.0 || !distance.is_finite() || base_distance <= 0.0 {
        return min_scale;
    }
    distance / base_distance
}

/// Absolute bearing from `center` to `local` in degrees. Y grows downward,
/// so 90 degrees points straight down.
fn bearing_degrees(center: Point2D, local: Point2D) -> f64 {
    (local.y - center.y).atan2(local.x - center.x).to_degrees()
}
