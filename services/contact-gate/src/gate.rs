// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The contact form submission gate.
//!
//! Order of checks for every submission:
//! 1. Field validation (required fields, email, phone, message length)
//! 2. Session rate limit (cooldown, then hourly cap)
//!
//! Only a submission passing both is sanitized, counted against the
//! session, relayed to the notifier and appended to the audit log. Delivery
//! and audit failures degrade the result; they never reject it.

use crate::audit::{submission_id, AuditLog, AuditRecord};
use crate::config::{Config, SessionConfig};
use crate::error::SubmissionError;
use crate::limiter::{ceil_minutes, ceil_secs, RateLimitReason, RateLimitResult, RateLimiter};
use crate::model::SubmissionRequest;
use crate::notifier::{ContactNotification, DeliveryError, Notifier};
use crate::session::SessionContext;
use crate::validator::{SubmissionValidator, ValidationError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Accepted and relayed to the notifier
    Delivered { submission_id: String },
    /// Accepted and logged, but the notifier did not deliver
    Received {
        submission_id: String,
        warning: DeliveryError,
    },
    /// Not accepted; nothing was recorded
    Rejected(SubmissionError),
}

impl SubmissionResult {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    pub fn submission_id(&self) -> Option<&str> {
        match self {
            Self::Delivered { submission_id } | Self::Received { submission_id, .. } => {
                Some(submission_id)
            }
            Self::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Metric label for this outcome.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Received { .. } => "received",
            Self::Rejected(SubmissionError::Invalid(_)) => "invalid",
            Self::Rejected(SubmissionError::RateLimitedShort { .. }) => "rate_limited_short",
            Self::Rejected(SubmissionError::RateLimitedHourly { .. }) => "rate_limited_hourly",
        }
    }

    /// Text shown to the submitter.
    ///
    /// `fallback_contact` names the alternate channel suggested when the
    /// notification could not be sent.
    pub fn user_message(&self, fallback_contact: &str) -> String {
        match self {
            Self::Delivered { .. } => {
                "Thank you! Your message has been sent. I will get back to you soon.".to_string()
            }
            Self::Received { .. } => format!(
                "Your message has been received, but the email notification could not be sent. \
                 If you need a quick reply, please reach out via {fallback_contact}."
            ),
            Self::Rejected(err) => err.user_message(),
        }
    }
}

/// Validates, throttles and records contact form submissions.
pub struct SubmissionGate<N> {
    validator: SubmissionValidator,
    limiter: RateLimiter,
    notifier: N,
    audit: AuditLog,
    session_config: SessionConfig,
}

impl<N: Notifier> SubmissionGate<N> {
    pub fn new(
        validator: SubmissionValidator,
        limiter: RateLimiter,
        notifier: N,
        audit: AuditLog,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            validator,
            limiter,
            notifier,
            audit,
            session_config,
        }
    }

    /// Assemble a gate from service configuration.
    pub fn from_config(config: &Config, notifier: N) -> Self {
        Self::new(
            SubmissionValidator::new(config.validation.clone()),
            RateLimiter::new(config.rate_limit.clone()),
            notifier,
            AuditLog::new(config.audit.path.clone()),
            config.session.clone(),
        )
    }

    pub fn validator(&self) -> &SubmissionValidator {
        &self.validator
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Submit at the current wall-clock time.
    pub async fn submit(
        &self,
        session: &mut SessionContext,
        request: SubmissionRequest,
    ) -> SubmissionResult {
        self.submit_at(session, request, Utc::now()).await
    }

    /// Submit as if received at `now`.
    pub async fn submit_at(
        &self,
        session: &mut SessionContext,
        request: SubmissionRequest,
        now: DateTime<Utc>,
    ) -> SubmissionResult {
        if session.touch(now, &self.session_config) {
            debug!(session = %session.id(), "Session resumed after idle timeout");
        }

        let validated = match self.validator.validate(&request) {
            Ok(validated) => validated,
            Err(err) => {
                self.reject_invalid(session, &err, now);
                return SubmissionResult::Rejected(err.into());
            }
        };

        if let RateLimitResult::Limited {
            reason,
            retry_after,
        } = self.limiter.check(&session.rate_limit, now)
        {
            let err = match reason {
                RateLimitReason::Cooldown => SubmissionError::RateLimitedShort {
                    wait_seconds: ceil_secs(retry_after),
                },
                RateLimitReason::WindowExhausted => SubmissionError::RateLimitedHourly {
                    wait_minutes: ceil_minutes(retry_after),
                },
            };
            info!(
                session = %session.id(),
                reason = %reason,
                code = err.code(),
                "Submission rate limited"
            );
            return SubmissionResult::Rejected(err);
        }

        let submission = validated.sanitize();
        self.limiter.record(&mut session.rate_limit, now);

        let id = submission_id(submission.email(), now);
        let notification = ContactNotification {
            submission_id: id.clone(),
            received_at: now,
            submission,
        };

        let delivery = self.notifier.deliver(&notification).await;
        if let Err(e) = &delivery {
            match e {
                DeliveryError::Disabled => {
                    debug!(submission_id = %id, "Notifier disabled, skipping delivery");
                }
                _ => warn!(submission_id = %id, error = %e, "Notification delivery failed"),
            }
        }

        let record = AuditRecord {
            submission_id: id.clone(),
            recorded_at: now,
            submission: notification.submission,
        };
        if let Err(e) = self.audit.append(&record).await {
            warn!(submission_id = %id, error = %e, "Audit log write failed");
        }

        info!(
            submission_id = %id,
            session = %session.id(),
            project_type = %record.submission.project_type(),
            delivered = delivery.is_ok(),
            "Submission accepted"
        );

        match delivery {
            Ok(()) => SubmissionResult::Delivered { submission_id: id },
            Err(warning) => SubmissionResult::Received {
                submission_id: id,
                warning,
            },
        }
    }

    fn reject_invalid(
        &self,
        session: &mut SessionContext,
        err: &ValidationError,
        now: DateTime<Utc>,
    ) {
        session.record_failure();
        debug!(
            session = %session.id(),
            error = %err,
            failed_attempts = session.failed_attempts,
            "Submission rejected"
        );
        if let Some(reason) = session.check_suspicious(now, &self.session_config) {
            warn!(
                target: "security",
                session = %session.id(),
                reason = %reason,
                failed_attempts = session.failed_attempts,
                "Suspicious activity"
            );
        }
    }
}
