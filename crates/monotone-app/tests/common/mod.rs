//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use monotone_app::App;
use monotone_auth::{
    AuthClient, AuthError, AuthTransport, LoginRequest, RegisterRequest, RetryPolicy,
    TokenResponse,
};
use monotone_capture::{ChunkRetention, SyntheticCamera};
use url::Url;

/// Scripted auth transport. Unscripted logins are rejected with 401 and
/// unscripted registrations succeed.
#[derive(Default)]
pub struct StubAuthTransport {
    tokens: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    registrations: Mutex<VecDeque<Result<(), AuthError>>>,
    token_calls: AtomicUsize,
    register_calls: AtomicUsize,
    last_token_endpoint: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl StubAuthTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one `/auth/token` outcome.
    pub fn push_token(&self, outcome: Result<TokenResponse, AuthError>) {
        self.tokens.lock().expect("token queue").push_back(outcome);
    }

    /// Queues a successful `/auth/token` response carrying `token`.
    pub fn push_access_token(&self, token: &str) {
        self.push_token(Ok(TokenResponse {
            access_token: token.to_string(),
            token_type: Some("bearer".to_string()),
            expires_in: None,
        }));
    }

    /// Queues one `/auth/register` outcome.
    pub fn push_registration(&self, outcome: Result<(), AuthError>) {
        self.registrations
            .lock()
            .expect("registration queue")
            .push_back(outcome);
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn last_token_endpoint(&self) -> Option<String> {
        self.last_token_endpoint.lock().expect("endpoint").clone()
    }
}

impl AuthTransport for StubAuthTransport {
    fn request_token(
        &self,
        endpoint: &Url,
        _request: &LoginRequest<'_>,
    ) -> Result<TokenResponse, AuthError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token_endpoint.lock().expect("endpoint") = Some(endpoint.to_string());
        self.tokens
            .lock()
            .expect("token queue")
            .pop_front()
            .unwrap_or(Err(AuthError::Rejected(401)))
    }

    fn register(&self, _endpoint: &Url, _request: &RegisterRequest) -> Result<(), AuthError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.registrations
            .lock()
            .expect("registration queue")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Fast retry policy so retry tests do not sleep noticeably.
#[allow(dead_code)]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 2,
        jitter_ms: 0,
    }
}

/// Builds an app against the local development base URL.
#[allow(dead_code)]
pub fn app_with(transport: Arc<StubAuthTransport>, camera: Arc<SyntheticCamera>) -> App {
    let auth = AuthClient::new("http://localhost:8000/", transport)
        .expect("loopback base url should pass endpoint policy")
        .with_retry_policy(fast_retry())
        .with_session_ttl_ms(60_000);
    App::new(auth, camera, ChunkRetention::ResetPerRecording)
}

/// Builds an app that is already signed in at `t = 0`.
#[allow(dead_code)]
pub fn signed_in_app(camera: Arc<SyntheticCamera>) -> App {
    let transport = Arc::new(StubAuthTransport::new());
    transport.push_access_token("abc");
    let mut app = app_with(transport, camera);
    app.login("alice", "secret", 0)
        .expect("scripted login should succeed");
    app
}
