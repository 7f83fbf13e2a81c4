//! Decal Gesture Controller
//!
//! Classifies one pointer/touch interaction as a drag, resize, or rotate
//! and turns each movement into a transform update. States:
//!
//! ```text
//!            pointer_down(Body)          pointer_move (drag rule)
//!   Idle ───────────────────────▶ Dragging ◀──┐
//!    ▲  ─── pointer_down(Resize) ─▶ Resizing ◀─┤ pointer_move (resize rule)
//!    │  ─── pointer_down(Rotate) ─▶ Rotating ◀─┘ pointer_move (rotate rule)
//!    └──── pointer_up | pointer_cancel | surface_lost ────┘
//! ```
//!
//! Only one mode can be active because the state is a single enum. Entering
//! an active state attaches the move listener and returning to `Idle`
//! detaches it, so idle pointer motion costs nothing.

pub mod controller;

pub use controller::*;

/// Host hook for the process-wide pointer-move subscription.
///
/// The controller calls `attach` exactly once when a gesture starts and
/// `detach` exactly once when it ends.
pub trait MoveListener {
    fn attach(&mut self);

    fn detach(&mut self);
}

/// Listener for hosts that deliver every move unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl MoveListener for NoopListener {
    fn attach(&mut self) {}

    fn detach(&mut self) {}
}
