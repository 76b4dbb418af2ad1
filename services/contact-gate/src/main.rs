// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Gate Service
//!
//! Accepts contact form submissions over HTTP, validates and sanitizes
//! them, throttles each browser session and relays accepted messages to a
//! mail relay, keeping an append-only audit log.
//!
//! ## Endpoints
//!
//! - `GET /health`, `GET /healthz`: liveness
//! - `POST /contact`: JSON submission, session in `X-Session-Id`
//! - `GET /metrics`: Prometheus counters (unless `METRICS_ENABLED=false`)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables, optionally seeded
//! from a `.env` file:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_MIN_INTERVAL_SECS`: Minimum gap between submissions (default: 30)
//! - `RATE_MAX_PER_WINDOW`: Submissions per window (default: 3)
//! - `RATE_WINDOW_SECS`: Quiet time that resets the count (default: 3600)
//! - `NOTIFIER_ENABLED`, `SMTP_*`, `NOTIFY_*`: mail relay settings
//! - `AUDIT_LOG_PATH`: Audit log file (default: contact_submissions.txt)
//! - `SESSION_MAX_ENTRIES`: Sessions kept in memory (default: 10000)

use chrono::Utc;
use contact_gate::{
    config::Config,
    handlers::{router, AppState},
    notifier::MailNotifier,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded environment file");
    }

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        min_interval_secs = config.rate_limit.min_interval_secs,
        max_per_window = config.rate_limit.max_per_window,
        window_secs = config.rate_limit.window_secs,
        audit_log = %config.audit.path.display(),
        origins = config.validation.allowed_origins.len(),
        "Starting contact gate"
    );

    // Create application state
    let notifier = MailNotifier::from_config(&config.notifier);
    let state = Arc::new(AppState::new(config.clone(), notifier)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.sessions.cleanup(Utc::now()).await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
