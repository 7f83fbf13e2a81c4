use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};

use decal_common::config::AppConfig;
use decal_editor::EditorSession;
use decal_gesture::{GestureMode, MoveOutcome};
use decal_model::event::{parse_events, HitTarget};
use decal_model::geometry::{Point2D, RasterSize, SurfaceRect};
use decal_render_engine::ImageSource;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn png_source(name: &str, width: u32, height: u32, color: Rgba<u8>) -> ImageSource {
    let img = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ColorType::Rgba8)
        .unwrap();
    ImageSource::from_bytes(name, bytes)
}

/// Preview is twice the export size, offset on the page.
fn surface() -> SurfaceRect {
    SurfaceRect::new(30.0, 80.0, 400.0, 200.0)
}

async fn session_with_base() -> EditorSession {
    let mut session = EditorSession::open(
        AppConfig::default(),
        png_source("overlay.png", 64, 32, RED),
    )
    .await
    .unwrap();
    session
        .load_base_image(png_source("photo.png", 200, 100, BLUE), surface())
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn first_gesture_after_load_uses_fresh_surface() {
    let mut session = session_with_base().await;
    assert_eq!(session.base_size(), Some(RasterSize::new(200, 100)));

    session.pointer_down_on(HitTarget::Body, Point2D::new(230.0, 180.0));
    let outcome = session.pointer_move(Point2D::new(130.0, 130.0));
    session.pointer_up();

    assert_eq!(outcome, MoveOutcome::Applied(GestureMode::Drag));
    assert!((session.transform().x() - 25.0).abs() < 1e-9);
    assert!((session.transform().y() - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn loading_new_base_replaces_transform_and_cancels_gesture() {
    let mut session = session_with_base().await;
    session.set_opacity(0.3);
    session.pointer_down_on(HitTarget::RotateHandle, Point2D::new(230.0, 180.0));
    session.pointer_move(Point2D::new(230.0, 260.0));
    assert!(session.gesture_state().is_active());

    let resized = SurfaceRect::new(0.0, 0.0, 300.0, 300.0);
    session
        .load_base_image(png_source("second.png", 90, 90, BLUE), resized)
        .await
        .unwrap();

    assert!(!session.gesture_state().is_active());
    assert_eq!(session.snapshot().rotation, 0.0);
    assert_eq!(session.snapshot().opacity, 0.92);
    assert_eq!(session.surface(), Some(&resized));
}

#[tokio::test]
async fn failed_base_load_leaves_session_untouched() {
    let mut session = session_with_base().await;
    session.set_opacity(0.5);
    let err = session
        .load_base_image(ImageSource::from_bytes("bad.jpg", vec![0u8; 12]), surface())
        .await
        .unwrap_err();
    assert!(err.is_decode());
    assert_eq!(session.snapshot().opacity, 0.5);
    assert_eq!(session.base_size(), Some(RasterSize::new(200, 100)));
}

#[tokio::test]
async fn corrupt_overlay_fails_to_open() {
    let err = EditorSession::open(
        AppConfig::default(),
        ImageSource::from_bytes("overlay.png", vec![7u8; 5]),
    )
    .await
    .unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn hit_test_selects_gesture_mode() {
    let mut session = session_with_base().await;
    let style = session.preview().unwrap();
    let origin = surface().origin();

    let body = Point2D::new(origin.x + style.left, origin.y + style.top);
    assert_eq!(session.pointer_down(body), HitTarget::Body);
    assert_eq!(session.gesture_state().mode(), Some(GestureMode::Drag));
    session.pointer_up();

    let handle = style.resize_handle();
    let handle = Point2D::new(origin.x + handle.x, origin.y + handle.y);
    assert_eq!(session.pointer_down(handle), HitTarget::ResizeHandle);
    assert_eq!(session.gesture_state().mode(), Some(GestureMode::Resize));
    session.pointer_up();

    assert_eq!(session.pointer_down(Point2D::new(0.0, 0.0)), HitTarget::Outside);
    assert!(!session.gesture_state().is_active());
}

#[tokio::test]
async fn surface_loss_ends_gesture_and_ignores_moves() {
    let mut session = session_with_base().await;
    session.pointer_down_on(HitTarget::Body, Point2D::new(230.0, 180.0));
    session.surface_lost();
    assert!(!session.gesture_state().is_active());

    let before = session.snapshot();
    assert_eq!(session.pointer_move(Point2D::new(40.0, 90.0)), MoveOutcome::Idle);
    assert_eq!(session.snapshot(), before);
    assert!(session.preview().is_err());
}

#[tokio::test]
async fn export_job_is_unaffected_by_later_edits() {
    let mut session = session_with_base().await;
    let job = session.export_job().unwrap();

    session.pointer_down_on(HitTarget::Body, Point2D::new(230.0, 180.0));
    session.pointer_move(Point2D::new(30.0, 80.0));
    session.pointer_up();
    assert_eq!((session.snapshot().x, session.snapshot().y), (0.0, 0.0));

    let artifact = session.pipeline().run(job, None).await.unwrap();
    assert_eq!((artifact.placement.center.x, artifact.placement.center.y), (100.0, 50.0));
}

#[tokio::test]
async fn preview_and_export_agree_in_relative_terms() {
    let mut session = session_with_base().await;
    session.pointer_down_on(HitTarget::Body, Point2D::new(230.0, 180.0));
    session.pointer_move(Point2D::new(30.0 + 310.0, 80.0 + 60.0));
    session.pointer_up();
    session.pointer_down_on(HitTarget::ResizeHandle, Point2D::new(0.0, 0.0));
    session.pointer_move(Point2D::new(30.0 + 310.0 + 60.0, 80.0 + 60.0));
    session.pointer_up();

    let preview = session.preview().unwrap();
    let artifact = session.export(None).await.unwrap();
    let placed = artifact.placement;

    assert_eq!(artifact.size, RasterSize::new(200, 100));
    assert!((preview.left / 400.0 - placed.center.x / 200.0).abs() < 1e-12);
    assert!((preview.top / 200.0 - placed.center.y / 100.0).abs() < 1e-12);
    assert!((preview.width / 400.0 - placed.width / 200.0).abs() < 1e-12);
    assert!((preview.height / 200.0 - placed.height / 100.0).abs() < 1e-12);
    assert!((session.transform().scale() - 1.5).abs() < 1e-9);
}

#[tokio::test]
async fn scripted_events_drive_the_session() {
    let mut session = session_with_base().await;
    let script = r#"
# resize the surface, drag to the right third, then fade
{"t":0,"type":"surface_resized","left":0.0,"top":0.0,"width":300.0,"height":150.0}
{"t":16,"type":"pointer_down","target":"body","x":150.0,"y":75.0}
{"t":32,"type":"pointer_move","x":200.0,"y":75.0}
{"t":48,"type":"pointer_up"}
{"t":64,"type":"set_opacity","value":0.4}
"#;
    for event in parse_events(script).unwrap() {
        session.apply(&event);
    }

    let snap = session.snapshot();
    assert!((snap.x - 200.0 / 3.0).abs() < 1e-9);
    assert!((snap.y - 50.0).abs() < 1e-9);
    assert_eq!(snap.opacity, 0.4);
    assert!(!session.gesture_state().is_active());

    session.apply(&parse_events(r#"{"t":80,"type":"reset"}"#).unwrap()[0]);
    assert_eq!(session.snapshot().x, 50.0);
}

#[tokio::test]
async fn grabbing_rotate_handle_in_place_keeps_rotation() {
    let mut session = session_with_base().await;
    let origin = surface().origin();
    let to_device = |p: Point2D| Point2D::new(origin.x + p.x, origin.y + p.y);

    let handle = to_device(session.preview().unwrap().rotate_handle());
    assert_eq!(session.pointer_down(handle), HitTarget::RotateHandle);
    assert_eq!(
        session.pointer_move(handle),
        MoveOutcome::Applied(GestureMode::Rotate)
    );
    assert_eq!(session.transform().rotation(), 0.0);

    // Swing the handle straight below the center, then grab it again.
    session.pointer_move(to_device(Point2D::new(200.0, 160.0)));
    session.pointer_up();
    assert!((session.transform().rotation() - 90.0).abs() < 1e-9);

    let handle = to_device(session.preview().unwrap().rotate_handle());
    assert_eq!(session.pointer_down(handle), HitTarget::RotateHandle);
    session.pointer_move(handle);
    session.pointer_up();
    assert!((session.transform().rotation() - 90.0).abs() < 1e-9);
}
