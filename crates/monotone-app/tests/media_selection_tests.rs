//! Integration tests for file selection and classification.

mod common;

use std::sync::Arc;

use monotone_app::AppError;
use monotone_capture::SyntheticCamera;
use monotone_core::{CoreError, MediaKind, PickedFile};
use monotone_ui::SurfaceKind;

#[test]
fn media_selection_tests_replace_classification_on_each_pick() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));

    let image = app
        .select_files(vec![PickedFile::new("a.png", "image/png", vec![1])], 0)
        .expect("image selection");
    assert_eq!(image.kind, Some(MediaKind::Image));

    let video = app
        .select_files(vec![PickedFile::new("b.mp4", "video/mp4", vec![2])], 0)
        .expect("video selection");
    assert_eq!(video.kind, Some(MediaKind::Video));
    assert!(app.objects().resolve(&image.handle).is_err(), "old handle revoked");

    let third = app
        .select_files(vec![PickedFile::new("c.jpg", "image/jpeg", vec![3])], 0)
        .expect("third selection");
    let current = app.state().selected.as_ref().expect("selection present");
    assert_eq!(current, &third);
    assert!(current.is_image() && !current.is_video());
}

#[test]
fn media_selection_tests_unclassified_file_renders_nothing() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));
    app.select_files(vec![PickedFile::new("a.png", "image/png", vec![1])], 0)
        .expect("image selection");
    app.select_files(vec![PickedFile::new("notes.txt", "text/plain", vec![2])], 0)
        .expect("selection is advisory, not enforced");

    let kinds: Vec<SurfaceKind> = app.surfaces().iter().map(|view| view.kind).collect();
    assert_eq!(kinds, vec![SurfaceKind::LivePreview]);
}

#[test]
fn media_selection_tests_empty_drop_keeps_previous_selection() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));
    let image = app
        .select_files(vec![PickedFile::new("a.png", "image/png", vec![1])], 0)
        .expect("image selection");

    let result = app.select_files(Vec::new(), 0);

    assert!(matches!(result, Err(AppError::Core(CoreError::EmptySelection))));
    assert_eq!(app.state().selected.as_ref(), Some(&image));
}

#[test]
fn media_selection_tests_require_signed_in_home_view() {
    let transport = Arc::new(common::StubAuthTransport::new());
    let mut app = common::app_with(transport, Arc::new(SyntheticCamera::granted()));

    let result = app.select_files(vec![PickedFile::new("a.png", "image/png", vec![1])], 0);
    assert!(matches!(result, Err(AppError::ControlUnavailable(_))));
    assert!(app.objects().is_empty());
}
