// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form request validator.
//!
//! Checks run fail-fast, first failure wins:
//! - Required fields (name, email, message, project type)
//! - Email format
//! - Phone format (only when a phone number is given)
//! - Message length bounds
//!
//! The HTTP adapter additionally checks the `Origin` header against the
//! configured allow-list.

use crate::config::ValidationConfig;
use crate::model::{SubmissionRequest, ValidatedSubmission};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Message too short: at least {min} characters required")]
    MessageTooShort { min: usize },

    #[error("Message too long: at most {max} characters allowed")]
    MessageTooLong { max: usize },
}

/// Origin header rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OriginError {
    #[error("Missing Origin header")]
    Missing,

    #[error("Malformed Origin header: {0}")]
    Malformed(String),

    #[error("Origin not allowed: {0}")]
    NotAllowed(String),
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9\s()-]{7,20}$").expect("phone pattern compiles"))
}

/// Contact form validator.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    config: ValidationConfig,
}

impl SubmissionValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a complete submission.
    pub fn validate<'a>(
        &self,
        request: &'a SubmissionRequest,
    ) -> Result<ValidatedSubmission<'a>, ValidationError> {
        let name = request.name.trim();
        let email = request.email.trim();
        let message = request.message.trim();

        let project_type = match request.project_type {
            Some(p) if !name.is_empty() && !email.is_empty() && !message.is_empty() => p,
            _ => {
                debug!("Missing required fields");
                return Err(ValidationError::MissingFields);
            }
        };

        self.validate_email(email)?;

        let phone = non_blank(request.phone.as_deref());
        if let Some(phone) = phone {
            self.validate_phone(phone)?;
        }

        self.validate_message(message)?;

        Ok(ValidatedSubmission {
            name,
            email,
            company: non_blank(request.company.as_deref()),
            phone,
            project_type,
            message,
            budget: request.budget,
        })
    }

    /// Validate the email address format.
    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        if email_pattern().is_match(email) {
            Ok(())
        } else {
            debug!("Email format invalid");
            Err(ValidationError::InvalidEmail)
        }
    }

    /// Validate a phone number: `+`, digits, spaces, hyphens, parentheses.
    pub fn validate_phone(&self, phone: &str) -> Result<(), ValidationError> {
        if phone_pattern().is_match(phone) {
            Ok(())
        } else {
            debug!("Phone format invalid");
            Err(ValidationError::InvalidPhone)
        }
    }

    /// Validate message length in characters, bounds inclusive.
    pub fn validate_message(&self, message: &str) -> Result<(), ValidationError> {
        let len = message.chars().count();
        if len < self.config.min_message_chars {
            debug!(len, "Message too short");
            return Err(ValidationError::MessageTooShort {
                min: self.config.min_message_chars,
            });
        }
        if len > self.config.max_message_chars {
            debug!(len, "Message too long");
            return Err(ValidationError::MessageTooLong {
                max: self.config.max_message_chars,
            });
        }
        Ok(())
    }

    /// Validate the `Origin` header against the allow-list.
    ///
    /// An empty allow-list accepts every request, with or without the header.
    pub fn validate_origin(&self, origin: Option<&str>) -> Result<(), OriginError> {
        if self.config.allowed_origins.is_empty() {
            return Ok(());
        }

        let origin = match origin {
            Some(o) if !o.trim().is_empty() => o.trim(),
            _ => return Err(OriginError::Missing),
        };

        let normalized =
            normalize_origin(origin).ok_or_else(|| OriginError::Malformed(origin.to_string()))?;

        let allowed = self
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| normalize_origin(o))
            .any(|o| o == normalized);

        if allowed {
            debug!(origin = %normalized, "Origin allowed");
            Ok(())
        } else {
            Err(OriginError::NotAllowed(normalized))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Reduce an origin to `scheme://host[:port]`, lowercase.
///
/// Only http(s) origins with a host are accepted.
pub fn normalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
