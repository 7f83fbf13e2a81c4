//! The overlay transform and its value invariants.

use serde::{Deserialize, Serialize};

use decal_common::config::EngineConfig;
use decal_common::error::{DecalError, DecalResult};

/// Plain snapshot of the overlay placement.
///
/// `x`/`y` locate the overlay center as a percentage of the base image's
/// display area. Rotation is in degrees and is not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub opacity: f64,
}

impl OverlayTransform {
    /// Reject snapshots containing NaN or infinite fields.
    pub fn validate(&self) -> DecalResult<()> {
        for (field, value) in [
            ("x", self.x),
            ("y", self.y),
            ("scale", self.scale),
            ("rotation", self.rotation),
            ("opacity", self.opacity),
        ] {
            if !value.is_finite() {
                return Err(DecalError::out_of_range(field, value));
            }
        }
        Ok(())
    }
}

/// Bounds enforced by [`TransformModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
    pub default_opacity: f64,
}

impl TransformLimits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            min_opacity: config.min_opacity,
            max_opacity: config.max_opacity,
            default_opacity: config.default_opacity,
        }
    }

    /// The transform a freshly loaded base image starts with.
    pub fn defaults(&self) -> OverlayTransform {
        OverlayTransform {
            x: 50.0,
            y: 50.0,
            scale: 1.0_f64.clamp(self.min_scale, self.max_scale),
            rotation: 0.0,
            opacity: self.default_opacity,
        }
    }

    /// Clamp every field of `transform` into range. Position is kept inside
    /// `[0, 100]` and rotation is left as is.
    ///
    /// Non-finite fields are reported as `OutOfRangeInput`.
    pub fn clamp(&self, transform: &OverlayTransform) -> DecalResult<OverlayTransform> {
        transform.validate()?;
        Ok(OverlayTransform {
            x: transform.x.clamp(0.0, 100.0),
            y: transform.y.clamp(0.0, 100.0),
            scale: transform.scale.clamp(self.min_scale, self.max_scale),
            rotation: transform.rotation,
            opacity: transform.opacity.clamp(self.min_opacity, self.max_opacity),
        })
    }
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// The live, mutable overlay transform for one editing session.
///
/// Every setter is total: values are clamped into range, and NaN or
/// infinite inputs are dropped so the previous value is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformModel {
    current: OverlayTransform,
    limits: TransformLimits,
}

impl TransformModel {
    pub fn new(limits: TransformLimits) -> Self {
        Self {
            current: limits.defaults(),
            limits,
        }
    }

    pub fn limits(&self) -> &TransformLimits {
        &self.limits
    }

    /// Copy of the current values, detached from further mutation.
    pub fn snapshot(&self) -> OverlayTransform {
        self.current
    }

    pub fn x(&self) -> f64 {
        self.current.x
    }

    pub fn y(&self) -> f64 {
        self.current.y
    }

    pub fn scale(&self) -> f64 {
        self.current.scale
    }

    /// Raw stored rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.current.rotation
    }

    pub fn opacity(&self) -> f64 {
        self.current.opacity
    }

    /// Rotation folded into `[0, 360)` for display.
    pub fn normalized_rotation(&self) -> f64 {
        let r = self.current.rotation.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if r >= 360.0 {
            0.0
        } else {
            r
        }
    }

    pub fn reset(&mut self) {
        self.current = self.limits.defaults();
    }

    pub fn set_position(&mut self, x_pct: f64, y_pct: f64) {
        if let Some(x) = finite_or_warn("x", x_pct) {
            self.current.x = x.clamp(0.0, 100.0);
        }
        if let Some(y) = finite_or_warn("y", y_pct) {
            self.current.y = y.clamp(0.0, 100.0);
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        if let Some(s) = finite_or_warn("scale", scale) {
            self.current.scale = s.clamp(self.limits.min_scale, self.limits.max_scale);
        }
    }

    pub fn set_rotation_degrees(&mut self, angle: f64) {
        if let Some(a) = finite_or_warn("rotation", angle) {
            self.current.rotation = a;
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        if let Some(o) = finite_or_warn("opacity", opacity) {
            self.current.opacity = o.clamp(self.limits.min_opacity, self.limits.max_opacity);
        }
    }

    /// Apply every field of `transform`, clamping into range.
    ///
    /// Unlike the individual setters this reports non-finite input as
    /// `OutOfRangeInput` and leaves the model untouched.
    pub fn try_apply(&mut self, transform: &OverlayTransform) -> DecalResult<()> {
        self.current = self.limits.clamp(transform)?;
        Ok(())
    }
}

impl Default for TransformModel {
    fn default() -> Self {
        Self::new(TransformLimits::default())
    }
}

fn finite_or_warn(field: &'static str, value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        tracing::warn!(field, value, "Dropping non-finite transform input");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let model = TransformModel::default();
        assert_eq!(model.x(), 50.0);
        assert_eq!(model.y(), 50.0);
        assert_eq!(model.scale(), 1.0);
        assert_eq!(model.rotation(), 0.0);
        assert!((0.9..=0.95).contains(&model.opacity()));
    }

    #[test]
    fn test_position_clamps_to_nearest_boundary() {
        let mut model = TransformModel::default();
        model.set_position(-12.0, 140.0);
        assert_eq!((model.x(), model.y()), (0.0, 100.0));
    }

    #[test]
    fn test_scale_and_opacity_clamp() {
        let mut model = TransformModel::default();
        model.set_scale(10.0);
        assert_eq!(model.scale(), 4.0);
        model.set_scale(0.01);
        assert_eq!(model.scale(), 0.2);
        model.set_opacity(0.0);
        assert_eq!(model.opacity(), 0.1);
        model.set_opacity(3.0);
        assert_eq!(model.opacity(), 1.0);
    }

    #[test]
    fn test_non_finite_inputs_keep_previous_values() {
        let mut model = TransformModel::default();
        model.set_position(20.0, 30.0);
        model.set_scale(2.0);
        model.set_rotation_degrees(45.0);
        model.set_opacity(0.5);

        model.set_position(f64::NAN, f64::INFINITY);
        model.set_scale(f64::NAN);
        model.set_rotation_degrees(f64::NEG_INFINITY);
        model.set_opacity(f64::NAN);

        assert_eq!(model.x(), 20.0);
        assert_eq!(model.y(), 30.0);
        assert_eq!(model.scale(), 2.0);
        assert_eq!(model.rotation(), 45.0);
        assert_eq!(model.opacity(), 0.5);
    }

    #[test]
    fn test_set_position_keeps_finite_component() {
        let mut model = TransformModel::default();
        model.set_position(f64::NAN, 75.0);
        assert_eq!(model.x(), 50.0);
        assert_eq!(model.y(), 75.0);
    }

    #[test]
    fn test_rotation_stored_raw_and_normalized_for_display() {
        let mut model = TransformModel::default();
        model.set_rotation_degrees(-90.0);
        assert_eq!(model.rotation(), -90.0);
        assert!((model.normalized_rotation() - 270.0).abs() < 1e-9);

        model.set_rotation_degrees(725.0);
        assert!((model.normalized_rotation() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut model = TransformModel::default();
        model.set_position(3.0, 4.0);
        model.set_scale(3.0);
        model.set_rotation_degrees(33.0);
        model.set_opacity(0.2);
        model.reset();
        assert_eq!(model.snapshot(), TransformLimits::default().defaults());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut model = TransformModel::default();
        let snap = model.snapshot();
        model.set_position(10.0, 10.0);
        assert_eq!(snap.x, 50.0);
    }

    #[test]
    fn test_try_apply_rejects_non_finite_without_mutation() {
        let mut model = TransformModel::default();
        let before = model.snapshot();
        let bad = OverlayTransform {
            scale: f64::NAN,
            ..before
        };
        let err = model.try_apply(&bad).unwrap_err();
        assert!(matches!(
            err,
            DecalError::OutOfRangeInput { field: "scale", .. }
        ));
        assert_eq!(model.snapshot(), before);
    }

    #[test]
    fn test_try_apply_clamps() {
        let mut model = TransformModel::default();
        model
            .try_apply(&OverlayTransform {
                x: 120.0,
                y: 10.0,
                scale: 9.0,
                rotation: 370.0,
                opacity: 0.0,
            })
            .unwrap();
        assert_eq!(model.x(), 100.0);
        assert_eq!(model.scale(), 4.0);
        assert_eq!(model.rotation(), 370.0);
        assert_eq!(model.opacity(), 0.1);
    }

    proptest! {
        #[test]
        fn prop_in_range_position_reads_back_exactly(x in 0.0f64..=100.0, y in 0.0f64..=100.0) {
            let mut model = TransformModel::default();
            model.set_position(x, y);
            prop_assert_eq!(model.x(), x);
            prop_assert_eq!(model.y(), y);
        }

        #[test]
        fn prop_setters_never_leave_range(
            x in proptest::num::f64::ANY,
            y in proptest::num::f64::ANY,
            s in proptest::num::f64::ANY,
            o in proptest::num::f64::ANY,
        ) {
            let mut model = TransformModel::default();
            model.set_position(x, y);
            model.set_scale(s);
            model.set_opacity(o);
            prop_assert!((0.0..=100.0).contains(&model.x()));
            prop_assert!((0.0..=100.0).contains(&model.y()));
            prop_assert!((0.2..=4.0).contains(&model.scale()));
            prop_assert!((0.1..=1.0).contains(&model.opacity()));
        }
    }
}
