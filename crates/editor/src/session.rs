//! Editing session management.

use decal_common::config::AppConfig;
use decal_common::error::{DecalError, DecalResult};
use decal_gesture::{GestureController, GestureState, MoveListener, MoveOutcome, NoopListener};
use decal_model::event::{EventKind, HitTarget, InputEvent};
use decal_model::geometry::{Point2D, RasterSize, SurfaceRect};
use decal_model::transform::{OverlayTransform, TransformLimits, TransformModel};
use decal_render_engine::preview::PreviewStyle;
use decal_render_engine::source::decode_source;
use decal_render_engine::{
    ExportArtifact, ExportJob, ExportPipeline, ImageSource, ProgressCallback,
};

/// Move listener that records subscription changes in the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl MoveListener for TracingListener {
    fn attach(&mut self) {
        tracing::debug!("Pointer-move listener attached");
    }

    fn detach(&mut self) {
        tracing::debug!("Pointer-move listener detached");
    }
}

#[derive(Debug, Clone)]
struct LoadedBase {
    source: ImageSource,
    size: RasterSize,
}

/// A single editing session over one fixed overlay asset.
#[derive(Debug)]
pub struct EditorSession<L: MoveListener = NoopListener> {
    config: AppConfig,
    pipeline: ExportPipeline,
    overlay: ImageSource,
    overlay_size: RasterSize,
    base: Option<LoadedBase>,
    transform: TransformModel,
    surface: Option<SurfaceRect>,
    gestures: GestureController<L>,
}

impl EditorSession<NoopListener> {
    /// Open a session, decoding the overlay once to learn its size.
    pub async fn open(config: AppConfig, overlay: ImageSource) -> DecalResult<Self> {
        Self::open_with_listener(config, overlay, NoopListener).await
    }
}

impl<L: MoveListener> EditorSession<L> {
    pub async fn open_with_listener(
        config: AppConfig,
        overlay: ImageSource,
        listener: L,
    ) -> DecalResult<Self> {
        config.engine.validate()?;
        let overlay_size = decode_source(&overlay).await?.size();
        tracing::info!(
            overlay = %overlay.name(),
            width = overlay_size.width,
            height = overlay_size.height,
            "Editor session opened"
        );

        Ok(Self {
            pipeline: ExportPipeline::from_config(&config),
            overlay,
            overlay_size,
            base: None,
            transform: TransformModel::new(TransformLimits::from_config(&config.engine)),
            surface: None,
            gestures: GestureController::with_listener(&config.engine, listener),
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn transform(&self) -> &TransformModel {
        &self.transform
    }

    pub fn snapshot(&self) -> OverlayTransform {
        self.transform.snapshot()
    }

    pub fn surface(&self) -> Option<&SurfaceRect> {
        self.surface.as_ref()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn gestures(&self) -> &GestureController<L> {
        &self.gestures
    }

    /// Native size of the loaded base image.
    pub fn base_size(&self) -> Option<RasterSize> {
        self.base.as_ref().map(|b| b.size)
    }

    pub fn overlay_size(&self) -> RasterSize {
        self.overlay_size
    }

    /// Load a new base image.
    ///
    /// `surface` is the display rectangle measured when the image finished
    /// loading; it replaces any previous measurement before this returns.
    /// Any gesture in progress is cancelled and the transform is replaced
    /// with defaults. On decode failure the session is left unchanged.
    pub async fn load_base_image(
        &mut self,
        source: ImageSource,
        surface: SurfaceRect,
    ) -> DecalResult<RasterSize> {
        let size = decode_source(&source).await?.size();

        self.gestures.pointer_cancel();
        self.transform = TransformModel::new(TransformLimits::from_config(&self.config.engine));
        self.surface = Some(surface);
        tracing::info!(
            base = %source.name(),
            width = size.width,
            height = size.height,
            ?surface,
            "Base image loaded"
        );
        self.base = Some(LoadedBase { source, size });
        Ok(size)
    }

    /// The host re-measured the display surface.
    pub fn surface_resized(&mut self, surface: SurfaceRect) {
        tracing::debug!(?surface, "Display surface resized");
        self.surface = Some(surface);
    }

    /// The display surface was unmounted.
    pub fn surface_lost(&mut self) {
        self.surface = None;
        self.gestures.surface_lost();
    }

    /// Classify a press by hit-testing the current preview, then start the
    /// matching gesture. Returns the target that was hit.
    pub fn pointer_down(&mut self, device_point: Point2D) -> HitTarget {
        let target = match (self.preview(), self.surface.as_ref()) {
            (Ok(style), Some(surface)) => style.hit_test(device_point, surface),
            _ => HitTarget::Outside,
        };
        self.pointer_down_on(target, device_point);
        target
    }

    /// Start a gesture on an already-classified target.
    pub fn pointer_down_on(&mut self, target: HitTarget, device_point: Point2D) -> GestureState {
        self.gestures
            .pointer_down(target, device_point, self.surface.as_ref())
    }

    pub fn pointer_move(&mut self, device_point: Point2D) -> MoveOutcome {
        match self.surface.as_ref() {
            Some(surface) => self
                .gestures
                .pointer_move(device_point, surface, &mut self.transform),
            None if self.gestures.state().is_active() => {
                self.gestures.surface_lost();
                MoveOutcome::InvalidGeometry
            }
            None => MoveOutcome::Idle,
        }
    }

    pub fn pointer_up(&mut self) {
        self.gestures.pointer_up();
    }

    pub fn pointer_cancel(&mut self) {
        self.gestures.pointer_cancel();
    }

    /// Opacity slider.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.transform.set_opacity(opacity);
    }

    /// Reset button.
    pub fn reset(&mut self) {
        self.transform.reset();
    }

    /// Apply one scripted input event.
    pub fn apply(&mut self, event: &InputEvent) {
        match &event.kind {
            EventKind::PointerDown { target, x, y } => {
                self.pointer_down_on(*target, Point2D::new(*x, *y));
            }
            EventKind::PointerMove { x, y } => {
                self.pointer_move(Point2D::new(*x, *y));
            }
            EventKind::PointerUp => self.pointer_up(),
            EventKind::PointerCancel => self.pointer_cancel(),
            EventKind::SurfaceResized {
                left,
                top,
                width,
                height,
            } => self.surface_resized(SurfaceRect::new(*left, *top, *width, *height)),
            EventKind::SurfaceLost => self.surface_lost(),
            EventKind::SetOpacity { value } => self.set_opacity(*value),
            EventKind::Reset => self.reset(),
        }
    }

    /// Overlay placement for the live preview.
    pub fn preview(&self) -> DecalResult<PreviewStyle> {
        if self.base.is_none() {
            return Err(DecalError::render("no base image loaded"));
        }
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| DecalError::invalid_geometry("display surface is not mounted"))?;
        PreviewStyle::compute(
            surface,
            self.overlay_size,
            &self.transform.snapshot(),
            self.pipeline.renderer().reference_fraction(),
        )
    }

    /// Capture an export of the current state. The returned job is
    /// independent of the session and can run while editing continues.
    pub fn export_job(&self) -> DecalResult<ExportJob> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| DecalError::render("no base image loaded"))?;
        Ok(ExportJob {
            base: base.source.clone(),
            overlay: self.overlay.clone(),
            transform: self.transform.snapshot(),
        })
    }

    pub fn pipeline(&self) -> &ExportPipeline {
        &self.pipeline
    }

    /// Export the current state at the base image's native resolution.
    pub async fn export(&self, progress: Option<ProgressCallback>) -> DecalResult<ExportArtifact> {
        let job = self.export_job()?;
        self.pipeline.run(job, progress).await
    }
}
