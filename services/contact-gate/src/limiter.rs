// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-session submission rate limiter.
//!
//! Two throttles apply to accepted submissions:
//! 1. Short cooldown: a minimum gap (30s default) after every submission
//! 2. Hourly cap: at most 3 submissions per window (3600s default); the
//!    count only resets once a full window has passed since the last
//!    submission
//!
//! State lives in the caller's [`RateLimitState`]; the limiter itself only
//! holds policy, so one limiter serves every session.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is allowed
    Allowed {
        /// Submissions left in the current window, including this one
        remaining: u32,
    },
    /// Submission is rate limited
    Limited {
        /// Reason for rate limiting
        reason: RateLimitReason,
        /// Time until the limit expires
        retry_after: Duration,
    },
}

/// Reason for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitReason {
    /// Last submission was too recent
    Cooldown,
    /// Window quota used up
    WindowExhausted,
}

impl std::fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cooldown => write!(f, "Submission cooldown active"),
            Self::WindowExhausted => write!(f, "Hourly submission limit reached"),
        }
    }
}

/// Observable limiter state for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    Open,
    ThrottledShort,
    ThrottledHourly,
}

/// Per-session rate limit bookkeeping.
///
/// Never persisted: a new session starts with a clean slate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Time of the last accepted submission
    pub last_submission_time: Option<DateTime<Utc>>,
    /// Accepted submissions in the current window
    pub submission_count: u32,
    /// First counted submission of the current window
    pub window_start: Option<DateTime<Utc>>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the submission count still applies at `now`.
    ///
    /// The count holds through the final instant: a submission exactly
    /// `window` after the last one still sees the old count.
    pub fn window_active(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.last_submission_time {
            Some(last) => now - last <= window,
            None => false,
        }
    }

    /// Instant after which the count resets.
    pub fn window_end(&self, window: Duration) -> Option<DateTime<Utc>> {
        self.last_submission_time.map(|last| last + window)
    }
}

/// Submission rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check whether a session may submit at `now`. Does not consume a slot.
    pub fn check(&self, state: &RateLimitState, now: DateTime<Utc>) -> RateLimitResult {
        let window = self.config.window();
        let in_window = state.window_active(now, window);
        let used = if in_window { state.submission_count } else { 0 };

        if in_window && used >= self.config.max_per_window {
            // the boundary instant itself is still throttled
            let retry_after = state
                .window_end(window)
                .map(|end| end - now)
                .unwrap_or(window)
                .max(Duration::seconds(1));
            debug!(
                used,
                retry_after_secs = retry_after.num_seconds(),
                "Hourly submission limit reached"
            );
            return RateLimitResult::Limited {
                reason: RateLimitReason::WindowExhausted,
                retry_after,
            };
        }

        if let Some(last) = state.last_submission_time {
            let elapsed = now - last;
            let min_interval = self.config.min_interval();
            if elapsed < min_interval {
                let retry_after = min_interval - elapsed;
                debug!(
                    retry_after_ms = retry_after.num_milliseconds(),
                    "Submission cooldown active"
                );
                return RateLimitResult::Limited {
                    reason: RateLimitReason::Cooldown,
                    retry_after,
                };
            }
        }

        RateLimitResult::Allowed {
            remaining: self.config.max_per_window.saturating_sub(used),
        }
    }

    /// Count an accepted submission at `now`.
    pub fn record(&self, state: &mut RateLimitState, now: DateTime<Utc>) {
        if !state.window_active(now, self.config.window()) {
            state.window_start = Some(now);
            state.submission_count = 0;
        }
        state.submission_count += 1;
        state.last_submission_time = Some(now);
    }

    /// Current throttle state of a session.
    pub fn state_of(&self, state: &RateLimitState, now: DateTime<Utc>) -> ThrottleState {
        match self.check(state, now) {
            RateLimitResult::Allowed { .. } => ThrottleState::Open,
            RateLimitResult::Limited {
                reason: RateLimitReason::Cooldown,
                ..
            } => ThrottleState::ThrottledShort,
            RateLimitResult::Limited {
                reason: RateLimitReason::WindowExhausted,
                ..
            } => ThrottleState::ThrottledHourly,
        }
    }
}

/// Round a wait up to whole seconds.
pub fn ceil_secs(wait: Duration) -> u64 {
    let ms = wait.num_milliseconds().max(0) as u64;
    ms.div_ceil(1000)
}

/// Round a wait up to whole minutes.
pub fn ceil_minutes(wait: Duration) -> u64 {
    ceil_secs(wait).div_ceil(60)
}
