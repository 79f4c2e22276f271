//! Integration tests for the one-way grayscale filter.

mod common;

use std::sync::Arc;

use monotone_capture::{MediaChunk, SyntheticCamera};
use monotone_core::{FilterState, PickedFile};

#[test]
fn filter_toggle_tests_apply_is_idempotent_and_one_way() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));
    assert_eq!(app.state().filter, FilterState::Off);
    assert!(app.controls().apply_filter);

    assert!(app.apply_filter());
    assert!(!app.apply_filter());

    assert_eq!(app.state().filter, FilterState::Grayscale);
    assert!(!app.controls().apply_filter, "apply control disappears once on");
}

#[test]
fn filter_toggle_tests_style_every_surface_without_touching_bytes() {
    let mut app = common::signed_in_app(Arc::new(SyntheticCamera::granted()));
    let selected = app
        .select_files(vec![PickedFile::new("a.png", "image/png", vec![10, 20, 30])], 0)
        .expect("selection");
    app.start_recording(0).expect("start");
    app.on_chunk(MediaChunk(vec![7]));
    let recording = app.stop_recording().expect("stop");

    assert!(app.surfaces().iter().all(|view| view.css_filter == "none"));
    app.apply_filter();

    let views = app.surfaces();
    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|view| view.css_filter == "grayscale(100%)"));
    assert_eq!(
        app.objects().resolve(&selected.handle).expect("live").bytes,
        vec![10, 20, 30]
    );
    assert_eq!(app.objects().resolve(&recording).expect("live").bytes, vec![7]);
}
