// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact gate service.
//!
//! The service is the presentation layer for [`SubmissionGate`]: it owns
//! the browser sessions, maps gate outcomes to status codes and applies
//! the origin allow-list before a submission reaches the gate.

use crate::config::{is_valid_metrics_path, Config};
use crate::gate::{SubmissionGate, SubmissionResult};
use crate::metrics::{GateMetrics, MetricsError};
use crate::model::SubmissionRequest;
use crate::notifier::MailNotifier;
use crate::session::SessionStore;
use crate::validator::{normalize_origin, OriginError};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Header carrying the opaque session id in both directions.
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("x-session-id");

/// Shared application state.
pub struct AppState {
    pub gate: SubmissionGate<MailNotifier>,
    pub sessions: SessionStore,
    pub metrics: GateMetrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, notifier: MailNotifier) -> Result<Self, MetricsError> {
        Ok(Self {
            gate: SubmissionGate::from_config(&config, notifier),
            sessions: SessionStore::new(config.session.clone(), config.rate_limit.clone()),
            metrics: GateMetrics::new()?,
            config,
        })
    }
}

/// Contact submission response body.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    /// `delivered`, `received`, `rejected` or `forbidden`
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept a contact form submission.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SubmissionRequest>,
) -> Response {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if let Err(err) = state.gate.validator().validate_origin(origin) {
        return forbidden(&state, err);
    }

    let requested_session = headers.get(&SESSION_HEADER).and_then(|v| v.to_str().ok());
    let lease = state.sessions.get_or_create(requested_session, Utc::now()).await;

    let (result, session_id) = {
        let mut session = lease.handle.lock().await;
        let result = state.gate.submit(&mut session, request).await;
        (result, session.id().to_string())
    };
    if result.is_accepted() {
        state.sessions.register(&lease, Utc::now()).await;
    }
    state.metrics.observe(&result);

    debug!(
        session = %session_id,
        outcome = result.outcome_label(),
        "Contact submission processed"
    );

    let fallback = &state.config.contact.fallback_contact;
    let (status, body) = match &result {
        SubmissionResult::Delivered { submission_id } => (
            StatusCode::OK,
            ContactResponse {
                status: "delivered",
                message: result.user_message(fallback),
                code: None,
                submission_id: Some(submission_id.clone()),
                retry_after_secs: None,
            },
        ),
        SubmissionResult::Received { submission_id, .. } => (
            StatusCode::OK,
            ContactResponse {
                status: "received",
                message: result.user_message(fallback),
                code: None,
                submission_id: Some(submission_id.clone()),
                retry_after_secs: None,
            },
        ),
        SubmissionResult::Rejected(err) => (
            if err.is_rate_limited() {
                StatusCode::TOO_MANY_REQUESTS
            } else {
                StatusCode::BAD_REQUEST
            },
            ContactResponse {
                status: "rejected",
                message: err.user_message(),
                code: Some(err.code()),
                submission_id: None,
                retry_after_secs: err.retry_after_secs(),
            },
        ),
    };

    let retry_after = body.retry_after_secs;
    let mut response = (status, Json(body)).into_response();
    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response_headers.insert(SESSION_HEADER, value);
    }
    if let Some(secs) = retry_after {
        response_headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}

fn forbidden(state: &AppState, err: OriginError) -> Response {
    warn!(target: "security", error = %err, "Submission origin rejected");
    state.metrics.observe_rejected_origin();
    (
        StatusCode::FORBIDDEN,
        Json(ContactResponse {
            status: "forbidden",
            message: "This form can only be submitted from the website.".to_string(),
            code: Some("FORBIDDEN_ORIGIN"),
            submission_id: None,
            retry_after_secs: None,
        }),
    )
        .into_response()
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", post(contact));

    if state.config.metrics.enabled {
        let path = &state.config.metrics.path;
        if is_valid_metrics_path(path) {
            app = app.route(path, get(metrics));
        } else {
            warn!(path = %path, "Unusable metrics path, serving /metrics instead");
            app = app.route("/metrics", get(metrics));
        }
    }

    app.layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .validation
        .allowed_origins
        .iter()
        .filter_map(|o| normalize_origin(o))
        .filter_map(|o| HeaderValue::from_str(&o).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, SESSION_HEADER])
        .expose_headers([SESSION_HEADER, header::RETRY_AFTER])
}
