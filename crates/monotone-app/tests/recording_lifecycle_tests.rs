//! Integration tests for start/stop recording orderings.

mod common;

use std::sync::Arc;

use monotone_app::AppError;
use monotone_capture::{CameraAccess, CaptureError, MediaChunk, SyntheticCamera};
use monotone_ui::SurfaceKind;

#[test]
fn recording_lifecycle_tests_start_then_stop_yields_one_recording() {
    let camera = Arc::new(SyntheticCamera::granted());
    let mut app = common::signed_in_app(camera.clone());

    app.start_recording(100).expect("start should succeed");
    assert!(app.state().is_recording());
    assert!(app.on_chunk(MediaChunk(vec![1, 2])));
    assert!(app.on_chunk(MediaChunk(vec![3])));

    let handle = app.stop_recording().expect("stop should succeed");

    assert!(!app.state().is_recording());
    assert_eq!(app.state().recorded.as_ref(), Some(&handle));
    let object = app.objects().resolve(&handle).expect("recording registered");
    assert_eq!(object.mime_type, "video/webm");
    assert_eq!(object.bytes, vec![1, 2, 3]);
    assert_eq!(camera.active_tracks(), 0);

    let recorded: Vec<_> = app
        .surfaces()
        .into_iter()
        .filter(|view| view.kind == SurfaceKind::RecordedVideo)
        .collect();
    assert_eq!(recorded.len(), 1);
}

#[test]
fn recording_lifecycle_tests_start_twice_is_rejected() {
    let camera = Arc::new(SyntheticCamera::granted());
    let mut app = common::signed_in_app(camera.clone());

    app.start_recording(0).expect("first start");
    let second = app.start_recording(1);

    assert!(matches!(
        second,
        Err(AppError::ControlUnavailable("start_recording"))
    ));
    assert_eq!(camera.streams_opened(), 1);
    assert!(app.state().is_recording());
}

#[test]
fn recording_lifecycle_tests_stop_while_idle_is_rejected() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));

    assert!(matches!(
        app.stop_recording(),
        Err(AppError::ControlUnavailable("stop_recording"))
    ));
    assert_eq!(app.state().recorded, None);
}

#[test]
fn recording_lifecycle_tests_new_recording_replaces_previous() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));

    app.start_recording(0).expect("start");
    app.on_chunk(MediaChunk(vec![1]));
    let first = app.stop_recording().expect("stop");

    app.start_recording(1).expect("restart");
    app.on_chunk(MediaChunk(vec![2]));
    let second = app.stop_recording().expect("stop");

    assert_ne!(first, second);
    assert!(app.objects().resolve(&first).is_err());
    assert_eq!(
        app.objects().resolve(&second).expect("live").bytes,
        vec![2],
        "chunks from the first recording must not leak into the second"
    );
}

#[test]
fn recording_lifecycle_tests_camera_denial_propagates() {
    let camera = Arc::new(SyntheticCamera::with_access(CameraAccess::Denied));
    let mut app = common::signed_in_app(camera);

    let result = app.start_recording(0);

    assert!(matches!(
        result,
        Err(AppError::Capture(CaptureError::PermissionDenied))
    ));
    assert!(!app.state().is_recording());
    assert!(app.controls().start_recording);
}
