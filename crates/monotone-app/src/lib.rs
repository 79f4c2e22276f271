#![warn(missing_docs)]
//! # monotone-app
//!
//! ## Purpose
//! Orchestrates auth, file selection, live capture, recording assembly, and
//! UI state for `monotone`.
//!
//! ## Responsibilities
//! - Gate the media views behind the session lifecycle.
//! - Turn file picks and recordings into playable handles.
//! - Refuse actions whose controls are unavailable (start twice, stop idle).
//! - Release camera tracks whenever the live view goes away.
//!
//! ## Data flow
//! Shell event -> [`App`] method -> subsystem call (auth client, capture
//! session, object store) -> [`UiAction`] -> [`monotone_ui::reduce`] -> new
//! [`UiState`] rendered through [`App::controls`] and [`App::surfaces`].
//!
//! ## Ownership and lifetimes
//! [`App`] owns every subsystem. Only handles and status flags flow into
//! `UiState`; tokens stay inside the session machine and bytes inside the
//! object store.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Login failures still update
//! UI state (generic message) before the error is returned; camera failures
//! are returned without touching UI state.
//!
//! ## Security and privacy notes
//! Error text is passed through [`redact_sensitive`] before logging.

mod config;

use std::sync::Arc;

use monotone_auth::{
    AuthClient, AuthError, AuthTransport, Credentials, RegisterRequest, SessionMachine,
};
use monotone_capture::{CameraBackend, CaptureError, CaptureSession, ChunkRetention, MediaChunk};
use monotone_core::{
    CoreError, MediaHandle, ObjectStore, PickedFile, SelectedMedia, is_advisory_match,
    select_first,
};
use monotone_ui::{Controls, Route, SurfaceView, UiAction, UiState, reduce, resolve_route};
use thiserror::Error;

pub use config::{
    AppConfig, ConfigError, DEFAULT_AUTH_BASE_URL, ENV_AUTH_BASE_URL, ENV_AUTH_MAX_RETRIES,
    ENV_AUTH_TIMEOUT_MS, ENV_CHUNK_RETENTION, ENV_SESSION_TTL_SECS,
};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("MONOTONE_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Media capture and preview controller.
pub struct App {
    ui: UiState,
    session: SessionMachine,
    auth: AuthClient,
    capture: CaptureSession,
    objects: ObjectStore,
}

impl App {
    /// Creates a controller in the initial anonymous state.
    pub fn new(
        auth: AuthClient,
        camera: Arc<dyn CameraBackend>,
        retention: ChunkRetention,
    ) -> Self {
        Self {
            ui: UiState::new(app_version()),
            session: SessionMachine::new(),
            auth,
            capture: CaptureSession::new(camera, retention),
            objects: ObjectStore::new(),
        }
    }

    /// Creates a controller from runtime configuration.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when the configured base URL is rejected.
    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn AuthTransport>,
        camera: Arc<dyn CameraBackend>,
    ) -> Result<Self, AppError> {
        let auth = AuthClient::new(config.auth_base_url.as_str(), transport)?
            .with_retry_policy(config.retry)
            .with_session_ttl_ms(config.session_ttl_ms);
        Ok(Self::new(auth, camera, config.chunk_retention))
    }

    /// Current UI state.
    pub fn state(&self) -> &UiState {
        &self.ui
    }

    /// Session lifecycle machine.
    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    /// Registry of playable handles.
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    /// Control availability for the current state.
    pub fn controls(&self) -> Controls {
        monotone_ui::controls(&self.ui)
    }

    /// Visual surfaces for the current state.
    pub fn surfaces(&self) -> Vec<SurfaceView> {
        monotone_ui::surfaces(&self.ui)
    }

    fn dispatch(&mut self, action: UiAction) {
        self.ui = reduce(&self.ui, &action);
    }

    /// Navigates to `route`, applying auth redirects.
    ///
    /// Leaving the home view closes the live view.
    pub fn navigate(&mut self, route: Route) -> Route {
        self.dispatch(UiAction::Navigate(route));
        if self.ui.route != Route::Home {
            self.close_live_view();
        }
        self.ui.route
    }

    /// Submits the login form.
    ///
    /// Only reachable from the login view: a live session is expired first if
    /// its token has lapsed, and a still-valid one refuses the call. The
    /// previous error message is cleared before the request is sent. On
    /// failure the generic login message is shown and the error is returned.
    ///
    /// # Errors
    /// Returns [`AppError::ControlUnavailable`] while signed in and
    /// [`AppError::Auth`] for rejected, blank, or undeliverable logins.
    pub fn login(&mut self, username: &str, password: &str, now_ms: u64) -> Result<(), AppError> {
        self.tick(now_ms);
        if self.session.is_authenticated(now_ms)
            || resolve_route(&self.ui, Route::Login) != Route::Login
        {
            return Err(AppError::ControlUnavailable("login"));
        }

        self.session.begin_login()?;
        self.dispatch(UiAction::LoginSubmitted);

        match self
            .auth
            .login(&Credentials::new(username, password), now_ms)
        {
            Ok(credential) => {
                tracing::info!(
                    username,
                    expires_at_ms = credential.expires_at_ms,
                    "login succeeded"
                );
                self.session.on_login_success(credential);
                self.dispatch(UiAction::LoginSucceeded);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    username,
                    error = %redact_sensitive(&error.to_string()),
                    "login failed"
                );
                self.session.on_login_failure();
                self.close_live_view();
                self.dispatch(UiAction::LoginFailed);
                Err(error.into())
            }
        }
    }

    /// Submits the sign-up form. Success asks the user to log in.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] on failure; no message is shown to the user.
    pub fn register(&mut self, request: &RegisterRequest) -> Result<(), AppError> {
        self.dispatch(UiAction::RegistrationSubmitted);
        match self.auth.register(request) {
            Ok(()) => {
                tracing::info!(username = %request.username, "registration succeeded");
                self.dispatch(UiAction::RegistrationSucceeded);
                Ok(())
            }
            Err(error) => {
                tracing::error!(
                    username = %request.username,
                    error = %redact_sensitive(&error.to_string()),
                    "registration failed"
                );
                self.dispatch(UiAction::RegistrationFailed);
                Err(error.into())
            }
        }
    }

    /// Signs out and closes the live view.
    pub fn logout(&mut self) {
        self.session.logout();
        self.close_live_view();
        self.dispatch(UiAction::LoggedOut);
    }

    /// Re-evaluates session expiry.
    ///
    /// Returns `true` when the session expired on this tick; the live view is
    /// closed and the user is sent back to login.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.session.on_tick(now_ms) {
            return false;
        }

        tracing::info!(now_ms, "session expired");
        self.close_live_view();
        self.dispatch(UiAction::SessionExpired);
        true
    }

    /// Handles a drop or picker event.
    ///
    /// The first file replaces the previous selection, whose handle is
    /// revoked.
    ///
    /// # Errors
    /// Returns [`AppError::ControlUnavailable`] outside the home view or once
    /// the session has lapsed at `now_ms`, and [`AppError::Core`] for an empty
    /// selection.
    pub fn select_files(
        &mut self,
        files: Vec<PickedFile>,
        now_ms: u64,
    ) -> Result<SelectedMedia, AppError> {
        self.require_home("select_file", now_ms)?;
        let file = select_first(files)?;
        if !is_advisory_match(&file.declared_type) {
            tracing::debug!(
                name = %file.name,
                declared_type = %file.declared_type,
                "file outside advisory accept filter"
            );
        }

        let handle = self.objects.create(file.declared_type.clone(), file.bytes);
        let selected = SelectedMedia::classify(handle, file.name, &file.declared_type);
        if let Some(previous) = &self.ui.selected {
            self.objects.revoke(&previous.handle);
        }

        tracing::debug!(handle = %selected.handle, kind = ?selected.kind, "media selected");
        self.dispatch(UiAction::MediaSelected(selected.clone()));
        Ok(selected)
    }

    /// Starts camera capture and recording.
    ///
    /// # Errors
    /// Returns [`AppError::ControlUnavailable`] while already recording,
    /// outside the home view, or once the session has lapsed at `now_ms`, and
    /// [`AppError::Capture`] for camera failures.
    pub fn start_recording(&mut self, now_ms: u64) -> Result<(), AppError> {
        self.require_home("start_recording", now_ms)?;
        if !self.controls().start_recording {
            return Err(AppError::ControlUnavailable("start_recording"));
        }

        let stream_id = self.capture.start(now_ms)?;
        self.dispatch(UiAction::RecordingStarted { stream_id });
        Ok(())
    }

    /// Recorder data callback. Returns `false` when the chunk was dropped.
    pub fn on_chunk(&mut self, chunk: MediaChunk) -> bool {
        self.capture.on_data_available(chunk)
    }

    /// Stops recording and exposes the assembled recording.
    ///
    /// The previous recording handle is revoked.
    ///
    /// # Errors
    /// Returns [`AppError::ControlUnavailable`] when not recording.
    pub fn stop_recording(&mut self) -> Result<MediaHandle, AppError> {
        if !self.controls().stop_recording {
            return Err(AppError::ControlUnavailable("stop_recording"));
        }

        let recording = self.capture.stop()?;
        let handle = self.objects.create(recording.mime_type, recording.bytes);
        if let Some(previous) = &self.ui.recorded {
            self.objects.revoke(previous);
        }

        self.dispatch(UiAction::RecordingStopped {
            recording: handle.clone(),
        });
        Ok(handle)
    }

    /// Applies the grayscale filter. Returns `false` when already applied.
    pub fn apply_filter(&mut self) -> bool {
        if self.ui.filter.is_applied() {
            return false;
        }

        tracing::info!("grayscale filter applied");
        self.dispatch(UiAction::FilterApplied);
        true
    }

    /// Tears down the live view, stopping every camera track.
    ///
    /// Returns how many tracks were still running.
    pub fn close_live_view(&mut self) -> usize {
        let stopped = self.capture.teardown();
        if self.ui.live_stream.is_some() || self.ui.is_recording() {
            self.dispatch(UiAction::LiveViewClosed);
        }
        stopped
    }

    /// Expires a lapsed session, then checks that the home view is showing.
    fn require_home(&mut self, control: &'static str, now_ms: u64) -> Result<(), AppError> {
        self.tick(now_ms);
        if self.ui.route == Route::Home
            && self.ui.is_authenticated()
            && self.session.is_authenticated(now_ms)
        {
            Ok(())
        } else {
            Err(AppError::ControlUnavailable(control))
        }
    }
}

/// Redacts common secret markers in log-safe output.
///
/// Everything after the first `password`, `token`, `authorization`, or
/// `bearer` marker is replaced.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let first = ["password", "token", "authorization", "bearer"]
        .iter()
        .filter_map(|key| lower.find(key).map(|position| (position, *key)))
        .min_by_key(|(position, _)| *position);

    match first {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Auth subsystem error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Capture subsystem error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Media model error.
    #[error("media error: {0}")]
    Core(#[from] CoreError),
    /// The control for this action is not available in the current state.
    #[error("control unavailable: {0}")]
    ControlUnavailable(&'static str),
}
