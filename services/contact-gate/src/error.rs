// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types surfaced to contact form submitters

use crate::validator::ValidationError;
use thiserror::Error;

/// Why a submission was not accepted.
///
/// Input errors are user-correctable immediately; rate-limit errors after
/// the stated wait. Neither is fatal to the service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Rate limited: retry in {wait_seconds}s")]
    RateLimitedShort { wait_seconds: u64 },

    #[error("Rate limited: retry in {wait_minutes}min")]
    RateLimitedHourly { wait_minutes: u64 },
}

impl SubmissionError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid(ValidationError::MissingFields) => "MISSING_FIELDS",
            Self::Invalid(ValidationError::InvalidEmail) => "INVALID_EMAIL",
            Self::Invalid(ValidationError::InvalidPhone) => "INVALID_PHONE",
            Self::Invalid(ValidationError::MessageTooShort { .. }) => "MESSAGE_TOO_SHORT",
            Self::Invalid(ValidationError::MessageTooLong { .. }) => "MESSAGE_TOO_LONG",
            Self::RateLimitedShort { .. } => "RATE_LIMITED_SHORT",
            Self::RateLimitedHourly { .. } => "RATE_LIMITED_HOURLY",
        }
    }

    /// Message shown to the person filling in the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(ValidationError::MissingFields) => {
                "Please fill in all required fields (marked with *).".to_string()
            }
            Self::Invalid(ValidationError::InvalidEmail) => {
                "Please enter a valid email address.".to_string()
            }
            Self::Invalid(ValidationError::InvalidPhone) => {
                "Please enter a valid phone number (digits, spaces, +, - and parentheses only)."
                    .to_string()
            }
            Self::Invalid(ValidationError::MessageTooShort { min }) => {
                format!("Your message is too short. Please write at least {min} characters.")
            }
            Self::Invalid(ValidationError::MessageTooLong { max }) => {
                format!("Your message is too long. Please keep it under {max} characters.")
            }
            Self::RateLimitedShort { wait_seconds } => {
                format!("Please wait {wait_seconds} seconds before sending another message.")
            }
            Self::RateLimitedHourly { wait_minutes } => format!(
                "You have sent several messages recently. Please try again in {wait_minutes} minutes."
            ),
        }
    }

    /// Seconds the submitter should wait, for rate-limit errors.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitedShort { wait_seconds } => Some(*wait_seconds),
            Self::RateLimitedHourly { wait_minutes } => Some(wait_minutes * 60),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RateLimitedShort { .. } | Self::RateLimitedHourly { .. }
        )
    }
}
