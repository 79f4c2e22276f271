#![warn(missing_docs)]
//! # monotone-capture
//!
//! ## Purpose
//! Provides camera stream acquisition and in-memory recording for `monotone`.
//!
//! ## Responsibilities
//! - Define a backend-agnostic camera trait.
//! - Expose a deterministic synthetic camera for CI and unit tests.
//! - Drive one live capture session: start, buffer chunks, stop, teardown.
//! - Assemble buffered chunks into one playable recording.
//!
//! ## Data flow
//! [`CaptureSession::start`] asks a [`CameraBackend`] for a [`LiveStream`] ->
//! platform callbacks feed [`MediaChunk`] values into
//! [`CaptureSession::on_data_available`] -> [`CaptureSession::stop`] releases
//! the stream and returns an [`AssembledRecording`].
//!
//! ## Ownership and lifetimes
//! The session owns the active stream and the chunk sequence. Chunks are only
//! appended through `&mut self`, so no lock guards them. Tracks share a live
//! flag with the backend that issued them, which lets backends report how many
//! tracks are still running.
//!
//! ## Error model
//! Permission and device failures from the backend are surfaced unchanged as
//! [`CaptureError`]. Illegal orderings (start twice, stop while idle) are
//! rejected instead of reaching the backend.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Fixed container type of assembled recordings.
pub const RECORDING_MIME_TYPE: &str = "video/webm";

/// Media constraints passed to the camera backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Request a video track.
    pub video: bool,
    /// Request an audio track.
    pub audio: bool,
}

impl StreamConstraints {
    /// Video only, no audio.
    pub const fn camera_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// Kind of one stream track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Camera video track.
    Video,
    /// Microphone audio track.
    Audio,
}

/// One hardware track of a live stream.
///
/// Clones share the same live flag.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    /// Creates a running track.
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Track identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Track kind.
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Returns `true` until the track is stopped.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stops the track. Returns `true` when it was still running.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }
}

/// Active camera feed bound to the live preview surface.
#[derive(Debug)]
pub struct LiveStream {
    id: String,
    tracks: Vec<MediaTrack>,
}

impl LiveStream {
    /// Creates a stream from backend-issued tracks.
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    /// Stream identifier used by the preview surface.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stream tracks.
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Returns number of tracks that are still running.
    pub fn active_track_count(&self) -> usize {
        self.tracks.iter().filter(|track| track.is_live()).count()
    }

    /// Stops every track and returns how many were still running.
    pub fn stop_all_tracks(&self) -> usize {
        self.tracks.iter().filter(|track| track.stop()).count()
    }
}

/// Trait implemented by concrete camera providers.
pub trait CameraBackend: Send + Sync {
    /// Requests camera access and opens a stream.
    ///
    /// # Errors
    /// Returns [`CaptureError::PermissionDenied`] or [`CaptureError::NoDevice`]
    /// when access cannot be granted.
    fn open_stream(&self, constraints: StreamConstraints) -> Result<LiveStream, CaptureError>;
}

/// Permission outcome simulated by [`SyntheticCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAccess {
    /// User grants access.
    Granted,
    /// User denies the permission prompt.
    Denied,
    /// No camera hardware present.
    NoDevice,
}

/// Deterministic camera backend for test and CI usage.
#[derive(Debug)]
pub struct SyntheticCamera {
    access: CameraAccess,
    issued: Mutex<Vec<Vec<MediaTrack>>>,
}

impl SyntheticCamera {
    /// Camera that grants every request.
    pub fn granted() -> Self {
        Self::with_access(CameraAccess::Granted)
    }

    /// Camera that simulates a specific permission outcome.
    pub fn with_access(access: CameraAccess) -> Self {
        Self {
            access,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Number of issued tracks that are still running.
    pub fn active_tracks(&self) -> usize {
        self.issued
            .lock()
            .map(|issued| {
                issued
                    .iter()
                    .flatten()
                    .filter(|track| track.is_live())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of streams opened so far.
    pub fn streams_opened(&self) -> usize {
        self.issued.lock().map(|issued| issued.len()).unwrap_or(0)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::granted()
    }
}

impl CameraBackend for SyntheticCamera {
    fn open_stream(&self, constraints: StreamConstraints) -> Result<LiveStream, CaptureError> {
        match self.access {
            CameraAccess::Granted => {}
            CameraAccess::Denied => return Err(CaptureError::PermissionDenied),
            CameraAccess::NoDevice => return Err(CaptureError::NoDevice),
        }

        let mut issued = self
            .issued
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic track lock poisoned".to_string()))?;
        let sequence = issued.len() + 1;

        let mut tracks = Vec::new();
        if constraints.video {
            tracks.push(MediaTrack::new(
                format!("synthetic-video-{sequence}"),
                TrackKind::Video,
            ));
        }
        if constraints.audio {
            tracks.push(MediaTrack::new(
                format!("synthetic-audio-{sequence}"),
                TrackKind::Audio,
            ));
        }

        issued.push(tracks.clone());

        Ok(LiveStream::new(format!("synthetic-stream-{sequence}"), tracks))
    }
}

/// One binary fragment produced while recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk(pub Vec<u8>);

/// What happens to buffered chunks when a new recording starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChunkRetention {
    /// Clear the chunk sequence at every start.
    #[default]
    ResetPerRecording,
    /// Keep every chunk since the session began, so later recordings also
    /// contain earlier footage.
    Accumulate,
}

impl FromStr for ChunkRetention {
    type Err = CaptureError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::ResetPerRecording),
            "accumulate" => Ok(Self::Accumulate),
            other => Err(CaptureError::UnknownRetention(other.to_string())),
        }
    }
}

/// Concatenated recording ready to be registered as a playable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRecording {
    /// Container type, always [`RECORDING_MIME_TYPE`].
    pub mime_type: &'static str,
    /// Concatenated chunk bytes.
    pub bytes: Vec<u8>,
    /// Number of chunks that went into the recording.
    pub chunk_count: usize,
}

/// Append-only chunk sequence.
#[derive(Debug, Clone, Default)]
pub struct RecordingAssembler {
    chunks: Vec<MediaChunk>,
}

impl RecordingAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk.
    pub fn push(&mut self, chunk: MediaChunk) {
        self.chunks.push(chunk);
    }

    /// Drops every buffered chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Returns buffered chunk count.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenates every buffered chunk in arrival order.
    ///
    /// The buffer is left untouched; retention is the session's decision.
    pub fn assemble(&self) -> AssembledRecording {
        let total = self.chunks.iter().map(|chunk| chunk.0.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in &self.chunks {
            bytes.extend_from_slice(&chunk.0);
        }

        AssembledRecording {
            mime_type: RECORDING_MIME_TYPE,
            bytes,
            chunk_count: self.chunks.len(),
        }
    }
}

/// Recording phase of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No recording in progress.
    Idle,
    /// Camera stream is live and chunks are buffered.
    Recording,
}

/// One live-capture view: stream handle, recorder buffer, and phase.
pub struct CaptureSession {
    backend: Arc<dyn CameraBackend>,
    retention: ChunkRetention,
    stream: Option<LiveStream>,
    started_at_ms: Option<u64>,
    assembler: RecordingAssembler,
}

impl CaptureSession {
    /// Creates an idle session bound to `backend`.
    pub fn new(backend: Arc<dyn CameraBackend>, retention: ChunkRetention) -> Self {
        Self {
            backend,
            retention,
            stream: None,
            started_at_ms: None,
            assembler: RecordingAssembler::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        if self.stream.is_some() {
            SessionPhase::Recording
        } else {
            SessionPhase::Idle
        }
    }

    /// Returns `true` while recording.
    pub fn is_recording(&self) -> bool {
        self.phase() == SessionPhase::Recording
    }

    /// Active stream bound to the live preview, if any.
    pub fn live_stream(&self) -> Option<&LiveStream> {
        self.stream.as_ref()
    }

    /// Epoch milliseconds when the current recording started.
    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Number of buffered chunks.
    pub fn buffered_chunks(&self) -> usize {
        self.assembler.len()
    }

    /// Opens a camera-only stream and starts buffering.
    ///
    /// # Returns
    /// The live stream id to bind to the preview surface.
    ///
    /// # Errors
    /// Returns [`CaptureError::AlreadyRecording`] while a recording is active.
    /// Propagates backend permission/device failures unchanged.
    pub fn start(&mut self, now_ms: u64) -> Result<String, CaptureError> {
        if self.is_recording() {
            return Err(CaptureError::AlreadyRecording);
        }

        let stream = self.backend.open_stream(StreamConstraints::camera_only())?;
        if self.retention == ChunkRetention::ResetPerRecording {
            self.assembler.clear();
        }

        let stream_id = stream.id().to_string();
        tracing::info!(
            stream = %stream_id,
            tracks = stream.tracks().len(),
            retained_chunks = self.assembler.len(),
            "recording started"
        );

        self.stream = Some(stream);
        self.started_at_ms = Some(now_ms);
        Ok(stream_id)
    }

    /// Recorder data callback.
    ///
    /// Returns `false` when the chunk was dropped because nothing is recording.
    pub fn on_data_available(&mut self, chunk: MediaChunk) -> bool {
        if !self.is_recording() {
            tracing::debug!(bytes = chunk.0.len(), "dropping chunk outside recording");
            return false;
        }

        self.assembler.push(chunk);
        true
    }

    /// Stops recording, releases the stream, and assembles the chunks.
    ///
    /// # Errors
    /// Returns [`CaptureError::NotRecording`] when idle.
    pub fn stop(&mut self) -> Result<AssembledRecording, CaptureError> {
        let stream = self.stream.take().ok_or(CaptureError::NotRecording)?;
        let stopped = stream.stop_all_tracks();
        self.started_at_ms = None;

        let recording = self.assembler.assemble();
        tracing::info!(
            stream = %stream.id(),
            stopped_tracks = stopped,
            chunks = recording.chunk_count,
            bytes = recording.bytes.len(),
            "recording stopped"
        );

        Ok(recording)
    }

    /// Releases the camera when the owning view goes away.
    ///
    /// An in-progress recording is discarded without assembly.
    /// Returns how many tracks were still running.
    pub fn teardown(&mut self) -> usize {
        let Some(stream) = self.stream.take() else {
            return 0;
        };

        self.started_at_ms = None;
        let stopped = stream.stop_all_tracks();
        tracing::info!(stream = %stream.id(), stopped_tracks = stopped, "live view closed");
        stopped
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Capture layer error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// User or platform denied camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// No camera hardware is available.
    #[error("no camera device available")]
    NoDevice,
    /// `start` was called while a recording is active.
    #[error("a recording is already in progress")]
    AlreadyRecording,
    /// `stop` was called while idle.
    #[error("no recording in progress")]
    NotRecording,
    /// Unrecognized chunk retention setting.
    #[error("unknown chunk retention `{0}` (expected `reset` or `accumulate`)")]
    UnknownRetention(String),
    /// Backend runtime failure.
    #[error("camera backend failure: {0}")]
    Backend(String),
}
