// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for submission outcomes.

use crate::gate::SubmissionResult;
use prometheus::{opts, Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Register(#[source] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),

    #[error("Metrics output is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Gate metrics on a private registry.
#[derive(Clone)]
pub struct GateMetrics {
    registry: Registry,
    /// Labels: `outcome` (delivered, received, invalid, rate_limited_short, rate_limited_hourly)
    submissions: IntCounterVec,
    notifier_failures: IntCounter,
}

impl GateMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            opts!("contact_submissions_total", "Contact form submissions by outcome"),
            &["outcome"],
        )
        .map_err(MetricsError::Register)?;
        let notifier_failures = IntCounter::with_opts(opts!(
            "contact_notifier_failures_total",
            "Accepted submissions whose notification was not delivered"
        ))
        .map_err(MetricsError::Register)?;

        registry
            .register(Box::new(submissions.clone()))
            .map_err(MetricsError::Register)?;
        registry
            .register(Box::new(notifier_failures.clone()))
            .map_err(MetricsError::Register)?;

        Ok(Self {
            registry,
            submissions,
            notifier_failures,
        })
    }

    /// Count one gate outcome.
    pub fn observe(&self, result: &SubmissionResult) {
        self.submissions
            .with_label_values(&[result.outcome_label()])
            .inc();
        if matches!(result, SubmissionResult::Received { .. }) {
            self.notifier_failures.inc();
        }
    }

    /// Count a request turned away before reaching the gate.
    pub fn observe_rejected_origin(&self) {
        self.submissions.with_label_values(&["forbidden_origin"]).inc();
    }

    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    pub fn notifier_failures(&self) -> u64 {
        self.notifier_failures.get()
    }

    /// Render in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(MetricsError::Encode)?;
        Ok(String::from_utf8(buffer)?)
    }
}
