// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.
//!
//! Time is simulated: request `i` arrives `i * interval_secs` after the
//! start, so throttling outcomes are deterministic.

#![allow(dead_code)]

/// What each request in a pattern carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Well-formed submissions
    Valid,
    /// Well-formed submissions with script injection in every text field
    Xss,
    /// Required fields left blank
    MissingFields,
    /// Malformed email addresses
    BadEmail,
}

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Simulated seconds between submissions
    pub interval_secs: i64,
    /// Number of distinct sessions the client rotates through
    pub sessions: usize,
    /// Submission content
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            interval_secs: 1,
            sessions: 1,
            payload: Payload::Valid,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// One session hammering the form.
    pub fn single_session_flood() -> Self {
        Self {
            total_requests: 200,
            interval_secs: 1,
            ..Default::default()
        }
    }

    /// Fresh session for every submission, as a client discarding cookies.
    pub fn session_rotation() -> Self {
        Self {
            total_requests: 100,
            interval_secs: 1,
            sessions: 100,
            ..Default::default()
        }
    }

    /// Script injection through every field, spread over sessions to stay
    /// under the throttle.
    pub fn xss_injection() -> Self {
        Self {
            total_requests: 60,
            interval_secs: 1,
            sessions: 60,
            payload: Payload::Xss,
        }
    }

    /// Blank submissions in a tight loop.
    pub fn missing_fields_spam() -> Self {
        Self {
            total_requests: 50,
            interval_secs: 1,
            payload: Payload::MissingFields,
            ..Default::default()
        }
    }

    /// Malformed addresses, e.g. header injection attempts.
    pub fn bad_email_spam() -> Self {
        Self {
            total_requests: 48,
            interval_secs: 2,
            payload: Payload::BadEmail,
            ..Default::default()
        }
    }

    /// One submission every hour and a second, so each finds the count reset.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 6,
            interval_secs: 3601,
            ..Default::default()
        }
    }

    /// One submission every 20 minutes, running past the hour mark.
    pub fn steady_drip() -> Self {
        Self {
            total_requests: 5,
            interval_secs: 1201,
            ..Default::default()
        }
    }

    /// Simulated duration of the pattern in seconds.
    pub fn simulated_duration_secs(&self) -> i64 {
        self.interval_secs * self.total_requests as i64
    }
}

/// Expected outcomes for a pattern.
pub struct AttackExpectations {
    /// Maximum submissions that should be accepted
    pub max_accepted: usize,
    /// Description of expected behavior
    pub description: &'static str,
}

impl AttackConfig {
    /// Get expected outcomes for this pattern under default limits
    /// (30s cooldown, 3 per 3600s).
    pub fn expectations(&self) -> AttackExpectations {
        match self.payload {
            Payload::MissingFields | Payload::BadEmail => AttackExpectations {
                max_accepted: 0,
                description: "Every submission should fail validation",
            },
            Payload::Valid | Payload::Xss if self.sessions >= self.total_requests => {
                AttackExpectations {
                    max_accepted: self.total_requests,
                    description: "Session throttling cannot see across sessions",
                }
            }
            Payload::Valid | Payload::Xss => {
                let per_session_hours =
                    (self.simulated_duration_secs() / 3600 + 1) as usize * 3;
                AttackExpectations {
                    max_accepted: per_session_hours * self.sessions,
                    description: "Each session capped at 3 submissions per hour",
                }
            }
        }
    }
}
