#![warn(missing_docs)]
//! # monotone-auth
//!
//! ## Purpose
//! Implements the auth gate for `monotone`: login and registration against
//! the external auth service plus the in-memory session lifecycle.
//!
//! ## Responsibilities
//! - Validate the auth base URL (HTTPS, or plain HTTP on loopback only).
//! - Execute `/auth/token` and `/auth/register` through an injectable
//!   [`AuthTransport`], retrying transient failures with backoff.
//! - Model session transitions (`Anonymous -> Pending -> Authenticated ->
//!   Expired`) used to gate the media views.
//!
//! ## Data flow
//! UI collects credentials -> [`SessionMachine::begin_login`] ->
//! [`AuthClient::login`] sends a form-encoded request through
//! [`AuthTransport`] -> [`SessionCredential`] ->
//! [`SessionMachine::on_login_success`].
//!
//! ## Ownership and lifetimes
//! Credentials and tokens are owned `String`s so transport calls never borrow
//! from UI input buffers.
//!
//! ## Error model
//! Endpoint policy violations, blank credentials, rejections, and transport
//! failures are surfaced as [`AuthError`]. [`classify_auth_error`] decides
//! which of them are worth retrying.
//!
//! ## Security and privacy notes
//! `Debug` output of [`Credentials`] and [`SessionCredential`] redacts secrets,
//! and this crate never logs passwords or tokens.
//!
//! ## Example
//! ```rust
//! use monotone_auth::{SessionMachine, SessionState};
//!
//! let machine = SessionMachine::new();
//! assert!(matches!(machine.state(), SessionState::Anonymous));
//! ```

mod http;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Host, Url};

pub use http::HttpAuthTransport;

/// Token endpoint path relative to the auth base URL.
pub const TOKEN_PATH: &str = "auth/token";

/// Registration endpoint path relative to the auth base URL.
pub const REGISTER_PATH: &str = "auth/register";

/// Session lifetime used when the token response carries no `expires_in`.
pub const DEFAULT_SESSION_TTL_MS: u64 = 60 * 60 * 1_000;

/// User-provided login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.username.trim().is_empty() || self.password.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Form body sent to `POST /auth/token`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    /// Username for account lookup.
    pub username: &'a str,
    /// Password for verification.
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JSON body returned by `POST /auth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token for protected calls.
    pub access_token: String,
    /// Token type, usually `bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// JSON body sent to `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Requested username.
    pub username: String,
    /// Requested password.
    pub password: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub full_name: String,
}

impl RegisterRequest {
    /// Creates a registration request.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// In-memory session token with absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    /// Opaque access token.
    pub access_token: String,
    /// Absolute epoch milliseconds when the token expires.
    pub expires_at_ms: u64,
}

impl SessionCredential {
    /// Returns `true` when the token has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session; login form is shown.
    Anonymous,
    /// A login request is in flight.
    Pending,
    /// Session is valid until its credential expires.
    Authenticated(SessionCredential),
    /// Credential expired; a new login is required.
    Expired,
}

/// Session state machine with explicit legal transitions.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    /// Creates a machine in `Anonymous` state.
    pub fn new() -> Self {
        Self {
            state: SessionState::Anonymous,
        }
    }

    /// Returns current state snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Marks a login request as in flight.
    ///
    /// # Errors
    /// Returns [`AuthError::LoginInProgress`] when a login is already pending.
    pub fn begin_login(&mut self) -> Result<(), AuthError> {
        if self.state == SessionState::Pending {
            return Err(AuthError::LoginInProgress);
        }
        self.state = SessionState::Pending;
        Ok(())
    }

    /// Applies login success.
    pub fn on_login_success(&mut self, credential: SessionCredential) {
        self.state = SessionState::Authenticated(credential);
    }

    /// Applies login failure; the session falls back to `Anonymous`.
    pub fn on_login_failure(&mut self) {
        self.state = SessionState::Anonymous;
    }

    /// Re-evaluates state based on token expiry.
    ///
    /// Returns `true` when this tick expired the session.
    pub fn on_tick(&mut self, now_ms: u64) -> bool {
        if let SessionState::Authenticated(credential) = &self.state
            && credential.is_expired(now_ms)
        {
            self.state = SessionState::Expired;
            return true;
        }
        false
    }

    /// Explicit logout transition.
    pub fn logout(&mut self) {
        self.state = SessionState::Anonymous;
    }

    /// Returns the credential while it is valid at `now_ms`.
    pub fn credential(&self, now_ms: u64) -> Option<&SessionCredential> {
        match &self.state {
            SessionState::Authenticated(credential) if !credential.is_expired(now_ms) => {
                Some(credential)
            }
            _ => None,
        }
    }

    /// Returns `true` when the gated views may be shown.
    pub fn is_authenticated(&self, now_ms: u64) -> bool {
        self.credential(now_ms).is_some()
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved auth service endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    /// `POST` target for login.
    pub token: Url,
    /// `POST` target for registration.
    pub register: Url,
}

impl AuthEndpoints {
    /// Resolves endpoints below `base_url`.
    ///
    /// A missing trailing slash is added so that a base path such as
    /// `https://host/api` resolves to `https://host/api/auth/token`.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEndpoint`] when the URL fails
    /// [`validate_base_url`].
    pub fn from_base(base_url: &str) -> Result<Self, AuthError> {
        let mut base = validate_base_url(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|error| AuthError::InvalidEndpoint(format!("cannot join {path}: {error}")))
        };

        Ok(Self {
            token: join(TOKEN_PATH)?,
            register: join(REGISTER_PATH)?,
        })
    }
}

/// Validates the auth base URL.
///
/// HTTPS is required, except for plain HTTP against a loopback host
/// (`localhost`, `127.0.0.0/8`, `::1`) used by local development servers.
///
/// # Errors
/// Returns [`AuthError::InvalidEndpoint`] for unparsable URLs, unsupported
/// schemes, or plain HTTP to a non-loopback host.
pub fn validate_base_url(base_url: &str) -> Result<Url, AuthError> {
    let parsed = Url::parse(base_url)
        .map_err(|error| AuthError::InvalidEndpoint(format!("invalid auth url: {error}")))?;

    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if is_loopback(&parsed) => Ok(parsed),
        "http" => Err(AuthError::InvalidEndpoint(
            "plain http is only allowed for loopback hosts".to_string(),
        )),
        other => Err(AuthError::InvalidEndpoint(format!(
            "unsupported scheme `{other}`"
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(address)) => address.is_loopback(),
        Some(Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

/// Abstract transport used by [`AuthClient`].
pub trait AuthTransport: Send + Sync {
    /// Sends a form-encoded login request.
    fn request_token(
        &self,
        endpoint: &Url,
        request: &LoginRequest<'_>,
    ) -> Result<TokenResponse, AuthError>;

    /// Sends a JSON registration request.
    fn register(&self, endpoint: &Url, request: &RegisterRequest) -> Result<(), AuthError>;
}

/// Retry configuration for auth calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay_ms: u64,
    /// Upper bound for the exponential delay, before jitter.
    pub max_delay_ms: u64,
    /// Maximum random jitter added to each delay.
    pub jitter_ms: u64,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_ms: 0,
        }
    }

    /// Exponential delay before retry number `retry` (1-based), without jitter.
    pub fn backoff_ms(&self, retry: u32) -> u64 {
        let exponent = retry.saturating_sub(1).min(32);
        self.base_delay_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_ms)
    }

    /// Delay before retry number `retry`, jitter included.
    pub fn delay(&self, retry: u32) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        Duration::from_millis(self.backoff_ms(retry).saturating_add(jitter))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 250,
            max_delay_ms: 2_000,
            jitter_ms: 100,
        }
    }
}

/// Retry classification for auth failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient; the same request may succeed later.
    Retriable,
    /// Repeating the request cannot help.
    Permanent,
}

/// Classifies an auth error for retry decisions.
pub fn classify_auth_error(error: &AuthError) -> FailureClass {
    match error {
        AuthError::Timeout | AuthError::Network(_) | AuthError::Server(_) => {
            FailureClass::Retriable
        }
        AuthError::InvalidEndpoint(_)
        | AuthError::EmptyCredential
        | AuthError::LoginInProgress
        | AuthError::Rejected(_)
        | AuthError::InvalidResponse(_) => FailureClass::Permanent,
    }
}

/// Auth client that resolves endpoints and executes login/registration.
#[derive(Clone)]
pub struct AuthClient {
    endpoints: AuthEndpoints,
    transport: Arc<dyn AuthTransport>,
    retry: RetryPolicy,
    session_ttl_ms: u64,
}

impl AuthClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEndpoint`] when the URL fails endpoint policy.
    pub fn new(base_url: &str, transport: Arc<dyn AuthTransport>) -> Result<Self, AuthError> {
        Ok(Self {
            endpoints: AuthEndpoints::from_base(base_url)?,
            transport,
            retry: RetryPolicy::default(),
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the session lifetime used when the server sends no `expires_in`.
    pub fn with_session_ttl_ms(mut self, session_ttl_ms: u64) -> Self {
        self.session_ttl_ms = session_ttl_ms;
        self
    }

    /// Returns resolved endpoints.
    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Exchanges credentials for a session credential.
    ///
    /// # Errors
    /// Returns [`AuthError::EmptyCredential`] for blank username/password
    /// without contacting the service, [`AuthError::InvalidResponse`] for an
    /// empty token, and the last transport error once retries are exhausted.
    pub fn login(
        &self,
        credentials: &Credentials,
        now_ms: u64,
    ) -> Result<SessionCredential, AuthError> {
        if credentials.is_blank() {
            return Err(AuthError::EmptyCredential);
        }

        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let response = self.with_retries("login", || {
            self.transport.request_token(&self.endpoints.token, &request)
        })?;

        if response.access_token.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "response missing access_token".to_string(),
            ));
        }

        let ttl_ms = response
            .expires_in
            .map(|seconds| seconds.saturating_mul(1_000))
            .unwrap_or(self.session_ttl_ms);

        Ok(SessionCredential {
            access_token: response.access_token,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        })
    }

    /// Registers a new account. Success means "proceed to login".
    ///
    /// # Errors
    /// Returns [`AuthError::EmptyCredential`] for blank username/password and
    /// the last transport error once retries are exhausted.
    pub fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        if request.username.trim().is_empty() || request.password.trim().is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        self.with_retries("register", || {
            self.transport.register(&self.endpoints.register, request)
        })
    }

    fn with_retries<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> Result<T, AuthError>,
    ) -> Result<T, AuthError> {
        let mut retry = 0;
        loop {
            match call() {
                Ok(value) => {
                    tracing::debug!(operation, attempts = retry + 1, "auth call succeeded");
                    return Ok(value);
                }
                Err(error)
                    if retry < self.retry.max_retries
                        && classify_auth_error(&error) == FailureClass::Retriable =>
                {
                    retry += 1;
                    let delay = self.retry.delay(retry);
                    tracing::warn!(
                        operation,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "retrying auth call"
                    );
                    std::thread::sleep(delay);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Errors produced by auth client/session logic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Endpoint violates URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Username or password is blank.
    #[error("username and password must be non-empty")]
    EmptyCredential,
    /// A login is already pending.
    #[error("a login request is already in progress")]
    LoginInProgress,
    /// Service rejected the request (4xx).
    #[error("request rejected with status {0}")]
    Rejected(u16),
    /// Service failed (5xx).
    #[error("auth service error status {0}")]
    Server(u16),
    /// Request timed out.
    #[error("auth request timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("auth transport failure: {0}")]
    Network(String),
    /// Response body violated the auth contract.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
}
