#![warn(missing_docs)]
//! # monotone-core
//!
//! ## Purpose
//! Defines the media data model shared across the `monotone` workspace.
//!
//! ## Responsibilities
//! - Classify user-chosen files as image or video by declared media type.
//! - Mint opaque playable handles for file and recording bytes.
//! - Model the one-way grayscale presentation filter.
//!
//! ## Data flow
//! A drop or picker event yields [`PickedFile`] values; [`select_first`] keeps
//! one of them, [`ObjectStore::create`] registers its bytes and returns a
//! [`MediaHandle`], and [`SelectedMedia`] pairs that handle with the
//! [`MediaKind`] derived from the declared type.
//!
//! ## Ownership and lifetimes
//! The [`ObjectStore`] owns every registered byte buffer. Handles are cheap
//! owned strings so UI state never borrows media bytes.
//!
//! ## Error model
//! Empty selections and unknown handles return [`CoreError`]. Malformed media
//! is never detected here: bytes are opaque to this crate.
//!
//! ## Example
//! ```rust
//! use monotone_core::{FilterState, MediaKind};
//!
//! assert_eq!(MediaKind::classify("image/png"), Some(MediaKind::Image));
//! let mut filter = FilterState::default();
//! filter.apply();
//! assert_eq!(filter.css_filter(), "grayscale(100%)");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Advisory accept filter offered to file pickers and drop targets.
pub const ACCEPT_FILTER: &str = "image/*,video/*";

/// Scheme prefix used when rendering handles.
pub const HANDLE_SCHEME: &str = "blob:monotone/";

/// CSS filter value applied while the grayscale filter is on.
pub const GRAYSCALE_CSS_FILTER: &str = "grayscale(100%)";

/// CSS filter value applied while the grayscale filter is off.
pub const NO_CSS_FILTER: &str = "none";

/// Media classification derived from a declared type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Still image (`image/...`).
    Image,
    /// Video (`video/...`).
    Video,
}

impl MediaKind {
    /// Classifies a declared media type by prefix.
    ///
    /// Returns `None` for any type that starts with neither `image` nor
    /// `video`, including the empty string.
    pub fn classify(declared_type: &str) -> Option<Self> {
        if declared_type.starts_with("image") {
            Some(Self::Image)
        } else if declared_type.starts_with("video") {
            Some(Self::Video)
        } else {
            None
        }
    }
}

/// Returns `true` when a declared type matches [`ACCEPT_FILTER`].
///
/// The filter is advisory: callers may still select non-matching files.
pub fn is_advisory_match(declared_type: &str) -> bool {
    declared_type.starts_with("image/") || declared_type.starts_with("video/")
}

/// Opaque handle to bytes registered in an [`ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaHandle(String);

impl MediaHandle {
    /// Returns the rendered handle string (`blob:monotone/<n>`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file delivered by a drop target or file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// File name reported by the platform.
    pub name: String,
    /// Declared media type (for example `image/png`). May be empty.
    pub declared_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl PickedFile {
    /// Creates a picked file value.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }
}

/// Keeps exactly one file from a drop or picker event.
///
/// # Errors
/// Returns [`CoreError::EmptySelection`] when no file was delivered.
pub fn select_first(files: Vec<PickedFile>) -> Result<PickedFile, CoreError> {
    files.into_iter().next().ok_or(CoreError::EmptySelection)
}

/// The current user-chosen media and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedMedia {
    /// Playable handle for the file bytes.
    pub handle: MediaHandle,
    /// File name reported by the platform.
    pub name: String,
    /// Classification, `None` when the declared type is neither image nor video.
    pub kind: Option<MediaKind>,
}

impl SelectedMedia {
    /// Pairs a handle with the classification of `declared_type`.
    pub fn classify(handle: MediaHandle, name: impl Into<String>, declared_type: &str) -> Self {
        Self {
            handle,
            name: name.into(),
            kind: MediaKind::classify(declared_type),
        }
    }

    /// Returns `true` when the selection renders as an image.
    pub fn is_image(&self) -> bool {
        self.kind == Some(MediaKind::Image)
    }

    /// Returns `true` when the selection renders as a video.
    pub fn is_video(&self) -> bool {
        self.kind == Some(MediaKind::Video)
    }
}

/// Registered bytes plus their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaObject {
    /// Media type used when the handle is rendered.
    pub mime_type: String,
    /// Owned object bytes.
    pub bytes: Vec<u8>,
}

/// In-memory registry that turns byte buffers into playable handles.
#[derive(Debug, Default)]
pub struct ObjectStore {
    next_id: u64,
    objects: HashMap<MediaHandle, MediaObject>,
}

impl ObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers bytes and returns a fresh handle.
    ///
    /// Handles are never reused within one store, even after revocation.
    pub fn create(&mut self, mime_type: impl Into<String>, bytes: Vec<u8>) -> MediaHandle {
        self.next_id += 1;
        let handle = MediaHandle(format!("{HANDLE_SCHEME}{}", self.next_id));
        self.objects.insert(
            handle.clone(),
            MediaObject {
                mime_type: mime_type.into(),
                bytes,
            },
        );
        handle
    }

    /// Looks up a registered object.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownHandle`] for revoked or foreign handles.
    pub fn resolve(&self, handle: &MediaHandle) -> Result<&MediaObject, CoreError> {
        self.objects
            .get(handle)
            .ok_or_else(|| CoreError::UnknownHandle(handle.to_string()))
    }

    /// Releases the bytes behind `handle`.
    ///
    /// Returns `true` when the handle was live.
    pub fn revoke(&mut self, handle: &MediaHandle) -> bool {
        self.objects.remove(handle).is_some()
    }

    /// Returns number of live handles.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` when no handles are live.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One-way grayscale presentation filter.
///
/// There is deliberately no way back to [`FilterState::Off`] once applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterState {
    /// Media is shown unmodified.
    #[default]
    Off,
    /// Media is shown with a full grayscale effect.
    Grayscale,
}

impl FilterState {
    /// Turns the filter on. Calling it again is a no-op.
    ///
    /// Returns `true` when this call changed the state.
    pub fn apply(&mut self) -> bool {
        let changed = *self == Self::Off;
        *self = Self::Grayscale;
        changed
    }

    /// Returns `true` when the grayscale effect is active.
    pub fn is_applied(&self) -> bool {
        *self == Self::Grayscale
    }

    /// Returns the CSS `filter` value for every visual surface.
    pub fn css_filter(&self) -> &'static str {
        match self {
            Self::Off => NO_CSS_FILTER,
            Self::Grayscale => GRAYSCALE_CSS_FILTER,
        }
    }
}

/// Error type for media model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A drop or picker event delivered no files.
    #[error("selection contained no files")]
    EmptySelection,
    /// Handle is not registered (never created or already revoked).
    #[error("unknown media handle: {0}")]
    UnknownHandle(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for classification, handles, and filter state.

    use super::*;

    #[test]
    fn classifies_by_declared_type_prefix() {
        assert_eq!(MediaKind::classify("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::classify("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::classify("application/pdf"), None);
        assert_eq!(MediaKind::classify(""), None);
    }

    #[test]
    fn advisory_filter_does_not_gate_classification() {
        assert!(!is_advisory_match("imagefoo"));
        assert_eq!(MediaKind::classify("imagefoo"), Some(MediaKind::Image));
    }

    #[test]
    fn revoked_handles_stop_resolving_and_are_not_reused() {
        let mut store = ObjectStore::new();
        let first = store.create("image/png", vec![1, 2, 3]);
        assert!(store.revoke(&first));
        assert!(!store.revoke(&first));
        assert!(matches!(
            store.resolve(&first),
            Err(CoreError::UnknownHandle(_))
        ));

        let second = store.create("image/png", vec![4]);
        assert_ne!(first, second);
        assert_eq!(store.resolve(&second).expect("live handle").bytes, vec![4]);
    }

    #[test]
    fn filter_apply_is_idempotent() {
        let mut filter = FilterState::default();
        assert_eq!(filter.css_filter(), "none");
        assert!(filter.apply());
        assert!(!filter.apply());
        assert!(filter.is_applied());
    }
}
