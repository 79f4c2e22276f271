#![warn(missing_docs)]
//! # monotone-ui
//!
//! ## Purpose
//! Defines the UI-facing state model for `monotone`.
//!
//! ## Responsibilities
//! - Hold every piece of view state in one serializable [`UiState`].
//! - Express transitions as a pure [`reduce`] over [`UiAction`] values.
//! - Resolve auth-gated routes and project control availability and media
//!   surfaces for rendering.
//!
//! ## Data flow
//! The app controller turns subsystem results into [`UiAction`]s ->
//! [`reduce`] returns the next [`UiState`] -> [`resolve_route`],
//! [`controls`], and [`surfaces`] drive what the shell renders.
//!
//! ## Ownership and lifetimes
//! `UiState` owns all string/handle values so reducers never borrow from
//! subsystem state.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Actions that are
//! illegal in the current state (stopping while idle, starting twice) leave
//! the state unchanged.
//!
//! ## Security and privacy notes
//! UI state intentionally excludes secrets (credentials, tokens, media bytes).

use monotone_core::{FilterState, MediaHandle, MediaKind, SelectedMedia};
use serde::{Deserialize, Serialize};

/// Generic message shown for every failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid details. Please try again.";

/// Notice shown after a successful registration.
pub const REGISTRATION_SUCCESS_NOTICE: &str = "Registration successful. Please log in.";

/// Navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Login form.
    Login,
    /// Sign-up form.
    Register,
    /// Media capture and preview view.
    Home,
}

/// UI projection of the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiSession {
    /// Not signed in.
    Anonymous,
    /// Login request in flight.
    Pending,
    /// Signed in.
    Authenticated,
    /// Session expired; sign in again.
    Expired,
}

/// Recording control status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingStatus {
    /// No recording in progress.
    Idle,
    /// Recording in progress.
    Recording,
}

/// Aggregate UI state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// App version shown in the shell.
    pub version: String,
    /// Currently displayed view.
    pub route: Route,
    /// Session projection.
    pub session: UiSession,
    /// Login error message, cleared by every new attempt.
    pub auth_error: Option<String>,
    /// Informational notice (registration success).
    pub notice: Option<String>,
    /// Current file selection.
    pub selected: Option<SelectedMedia>,
    /// Recording control status.
    pub recording: RecordingStatus,
    /// Stream bound to the live preview surface.
    pub live_stream: Option<String>,
    /// Latest assembled recording.
    pub recorded: Option<MediaHandle>,
    /// Grayscale presentation filter.
    pub filter: FilterState,
}

impl UiState {
    /// Creates the initial state: anonymous user on the login view.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            route: Route::Login,
            session: UiSession::Anonymous,
            auth_error: None,
            notice: None,
            selected: None,
            recording: RecordingStatus::Idle,
            live_stream: None,
            recorded: None,
            filter: FilterState::Off,
        }
    }

    /// Returns `true` when the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.session == UiSession::Authenticated
    }

    /// Returns `true` while recording.
    pub fn is_recording(&self) -> bool {
        self.recording == RecordingStatus::Recording
    }
}

/// State transitions fed into [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// User navigated to a route.
    Navigate(Route),
    /// Login form submitted.
    LoginSubmitted,
    /// Login request succeeded.
    LoginSucceeded,
    /// Login request failed.
    LoginFailed,
    /// Session credential expired.
    SessionExpired,
    /// User signed out.
    LoggedOut,
    /// Sign-up form submitted.
    RegistrationSubmitted,
    /// Registration request succeeded.
    RegistrationSucceeded,
    /// Registration request failed.
    RegistrationFailed,
    /// A file was selected.
    MediaSelected(SelectedMedia),
    /// Camera stream opened and recording began.
    RecordingStarted {
        /// Stream bound to the live preview.
        stream_id: String,
    },
    /// Recording stopped and was assembled.
    RecordingStopped {
        /// Handle of the assembled recording.
        recording: MediaHandle,
    },
    /// Live view torn down.
    LiveViewClosed,
    /// Grayscale filter applied.
    FilterApplied,
}

/// Computes the next state. Never mutates `state`.
pub fn reduce(state: &UiState, action: &UiAction) -> UiState {
    let mut next = state.clone();

    match action {
        UiAction::Navigate(route) => {
            next.route = resolve_route(state, *route);
        }
        UiAction::LoginSubmitted => {
            next.session = UiSession::Pending;
            next.auth_error = None;
        }
        UiAction::LoginSucceeded => {
            next.session = UiSession::Authenticated;
            next.auth_error = None;
            next.notice = None;
            next.route = Route::Home;
        }
        UiAction::LoginFailed => {
            next.session = UiSession::Anonymous;
            next.auth_error = Some(LOGIN_FAILED_MESSAGE.to_string());
            next.route = resolve_route(&next, state.route);
        }
        UiAction::SessionExpired => {
            next.session = UiSession::Expired;
            next.route = resolve_route(&next, state.route);
        }
        UiAction::LoggedOut => {
            next.session = UiSession::Anonymous;
            next.route = resolve_route(&next, state.route);
        }
        UiAction::RegistrationSubmitted => {
            next.notice = None;
        }
        UiAction::RegistrationSucceeded => {
            next.notice = Some(REGISTRATION_SUCCESS_NOTICE.to_string());
        }
        UiAction::RegistrationFailed => {}
        UiAction::MediaSelected(selected) => {
            next.selected = Some(selected.clone());
        }
        UiAction::RecordingStarted { stream_id } => {
            if !state.is_recording() {
                next.recording = RecordingStatus::Recording;
                next.live_stream = Some(stream_id.clone());
            }
        }
        UiAction::RecordingStopped { recording } => {
            if state.is_recording() {
                next.recording = RecordingStatus::Idle;
                next.live_stream = None;
                next.recorded = Some(recording.clone());
            }
        }
        UiAction::LiveViewClosed => {
            next.recording = RecordingStatus::Idle;
            next.live_stream = None;
        }
        UiAction::FilterApplied => {
            next.filter.apply();
        }
    }

    next
}

/// Resolves the route actually shown for a requested one.
///
/// The login view redirects home once signed in, the home view redirects to
/// login while signed out, and registration is always reachable.
pub fn resolve_route(state: &UiState, requested: Route) -> Route {
    match requested {
        Route::Login if state.is_authenticated() => Route::Home,
        Route::Home if !state.is_authenticated() => Route::Login,
        other => other,
    }
}

/// Availability of the home view controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// "Start Recording" is enabled.
    pub start_recording: bool,
    /// "Stop Recording" is enabled.
    pub stop_recording: bool,
    /// "Apply Black & White Filter" is shown.
    pub apply_filter: bool,
}

/// Projects control availability for the current state.
pub fn controls(state: &UiState) -> Controls {
    let home = state.route == Route::Home && state.is_authenticated();
    Controls {
        start_recording: home && !state.is_recording(),
        stop_recording: home && state.is_recording(),
        apply_filter: home && !state.filter.is_applied(),
    }
}

/// Kind of one rendered visual surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Playback of the latest assembled recording.
    RecordedVideo,
    /// Selected image file.
    UploadedImage,
    /// Selected video file.
    UploadedVideo,
    /// Live camera preview.
    LivePreview,
}

/// One visual surface with its source and presentation filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceView {
    /// Surface kind.
    pub kind: SurfaceKind,
    /// Media handle or stream id; `None` for an unbound live preview.
    pub source: Option<String>,
    /// CSS `filter` value.
    pub css_filter: &'static str,
}

/// Projects every surface rendered on the home view, in display order.
///
/// Returns nothing outside the authenticated home view. A selection whose
/// type is neither image nor video renders no surface.
pub fn surfaces(state: &UiState) -> Vec<SurfaceView> {
    if state.route != Route::Home || !state.is_authenticated() {
        return Vec::new();
    }

    let css_filter = state.filter.css_filter();
    let surface = |kind, source: Option<String>| SurfaceView {
        kind,
        source,
        css_filter,
    };

    let mut views = Vec::with_capacity(3);
    if let Some(recorded) = &state.recorded {
        views.push(surface(
            SurfaceKind::RecordedVideo,
            Some(recorded.to_string()),
        ));
    }

    if let Some(selected) = &state.selected {
        let kind = match selected.kind {
            Some(MediaKind::Image) => Some(SurfaceKind::UploadedImage),
            Some(MediaKind::Video) => Some(SurfaceKind::UploadedVideo),
            None => None,
        };
        if let Some(kind) = kind {
            views.push(surface(kind, Some(selected.handle.to_string())));
        }
    }

    views.push(surface(SurfaceKind::LivePreview, state.live_stream.clone()));
    views
}
