//! Blocking HTTP transport for the auth service.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use url::Url;

use crate::{AuthError, AuthTransport, LoginRequest, RegisterRequest, TokenResponse};

/// [`AuthTransport`] backed by a `reqwest` blocking client.
#[derive(Debug, Clone)]
pub struct HttpAuthTransport {
    client: Client,
}

impl HttpAuthTransport {
    /// Builds a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`AuthError::Network`] when the TLS backend cannot initialize.
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AuthError::Network(format!("http client init failed: {error}")))?;
        Ok(Self { client })
    }
}

impl AuthTransport for HttpAuthTransport {
    fn request_token(
        &self,
        endpoint: &Url,
        request: &LoginRequest<'_>,
    ) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .post(endpoint.clone())
            .form(request)
            .send()
            .map_err(map_send_error)?;

        check_status(response)?
            .json::<TokenResponse>()
            .map_err(|error| AuthError::InvalidResponse(error.to_string()))
    }

    fn register(&self, endpoint: &Url, request: &RegisterRequest) -> Result<(), AuthError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(request)
            .send()
            .map_err(map_send_error)?;

        check_status(response).map(|_| ())
    }
}

fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(status_error(status))
    }
}

fn status_error(status: StatusCode) -> AuthError {
    if status.is_server_error() {
        AuthError::Server(status.as_u16())
    } else {
        AuthError::Rejected(status.as_u16())
    }
}

fn map_send_error(error: reqwest::Error) -> AuthError {
    if error.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::Network(error.without_url().to_string())
    }
}
