// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Gate
//!
//! This crate provides the submission pipeline behind a portfolio contact
//! form:
//!
//! - Required-field, email, phone and message-length validation
//! - HTML escaping and script stripping of every free-text field
//! - Per-session throttling (30s cooldown, 3 submissions per hour default)
//! - Best-effort mail relay that degrades to a warning on failure
//! - Append-only audit log of accepted submissions
//! - Origin allow-list and suspicious-session logging

pub mod audit;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod model;
pub mod notifier;
pub mod sanitize;
pub mod session;
pub mod validator;

pub use config::Config;
pub use error::SubmissionError;
pub use gate::{SubmissionGate, SubmissionResult};
pub use limiter::{RateLimitResult, RateLimiter};
pub use model::{Budget, ProjectType, SanitizedSubmission, SubmissionRequest};
pub use notifier::{DeliveryError, MailNotifier, Notifier};
pub use session::{SessionContext, SessionStore};
pub use validator::{SubmissionValidator, ValidationError};
