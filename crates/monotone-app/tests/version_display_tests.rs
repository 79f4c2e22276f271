//! Integration tests for VERSION propagation into UI state.

mod common;

use std::fs;
use std::sync::Arc;

use monotone_app::app_version;
use monotone_capture::SyntheticCamera;

#[test]
fn version_display_tests_match_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());

    let transport = Arc::new(common::StubAuthTransport::new());
    let app = common::app_with(transport, Arc::new(SyntheticCamera::granted()));
    assert_eq!(app.state().version, root_version.trim());
}
