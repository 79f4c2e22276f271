#![warn(missing_docs)]
//! # monotone-app binary
//!
//! Headless entry point: loads configuration, wires the HTTP auth transport,
//! and reports the initial view.

use std::process::ExitCode;
use std::sync::Arc;

use monotone_app::{App, AppConfig, app_version};
use monotone_auth::HttpAuthTransport;
use monotone_capture::SyntheticCamera;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point.
fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpAuthTransport::new(config.auth_timeout) {
        Ok(transport) => transport,
        Err(error) => {
            tracing::error!(%error, "failed to initialize auth transport");
            return ExitCode::FAILURE;
        }
    };

    // No platform camera is wired into the headless binary.
    let camera = Arc::new(SyntheticCamera::granted());
    let app = match App::from_config(&config, Arc::new(transport), camera) {
        Ok(app) => app,
        Err(error) => {
            tracing::error!(%error, "failed to start monotone");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = app_version(),
        auth = %config.auth_base_url,
        retention = ?config.chunk_retention,
        "monotone started"
    );
    println!("monotone-app {}", app_version());
    println!(
        "route={:?} session={:?}",
        app.state().route,
        app.state().session
    );

    ExitCode::SUCCESS
}
