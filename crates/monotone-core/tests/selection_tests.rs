//! Tests single-file selection and classification replacement.

use monotone_core::{CoreError, MediaKind, ObjectStore, PickedFile, SelectedMedia, select_first};

#[test]
fn selection_tests_keep_only_first_dropped_file() {
    let files = vec![
        PickedFile::new("a.png", "image/png", vec![1]),
        PickedFile::new("b.mp4", "video/mp4", vec![2]),
    ];

    let picked = select_first(files).expect("first file should be kept");
    assert_eq!(picked.name, "a.png");
}

#[test]
fn selection_tests_reject_empty_drop() {
    assert_eq!(select_first(Vec::new()), Err(CoreError::EmptySelection));
}

#[test]
fn selection_tests_replace_prior_classification() {
    let mut store = ObjectStore::new();

    let image = SelectedMedia::classify(store.create("image/png", vec![1]), "a.png", "image/png");
    assert!(image.is_image() && !image.is_video());

    let video = SelectedMedia::classify(store.create("video/webm", vec![2]), "b.webm", "video/webm");
    assert!(video.is_video() && !video.is_image());

    let other = SelectedMedia::classify(store.create("text/plain", vec![3]), "c.txt", "text/plain");
    assert_eq!(other.kind, None);
    assert!(!other.is_image() && !other.is_video());
}

#[test]
fn selection_tests_serialize_handle_as_plain_string() {
    let mut store = ObjectStore::new();
    let selected = SelectedMedia::classify(store.create("image/gif", vec![]), "x.gif", "image/gif");

    let json = serde_json::to_value(&selected).expect("selection should serialize");
    assert_eq!(json["handle"], "blob:monotone/1");
    assert_eq!(json["kind"], serde_json::json!(MediaKind::Image));
}
