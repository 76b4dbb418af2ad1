// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Browser session bookkeeping.
//!
//! A [`SessionContext`] carries everything the gate mutates for one
//! visitor. The presentation layer owns it: the HTTP adapter keeps them in
//! a [`SessionStore`], other callers may hold one directly.

use crate::config::{RateLimitConfig, SessionConfig};
use crate::limiter::RateLimitState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Per-visitor state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: String,
    started_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    /// Rejected submissions (validation failures) in this session
    pub failed_attempts: u32,
    pub rate_limit: RateLimitState,
}

/// Why a session looks suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspicionReason {
    /// Too many rejected submissions
    RepeatedFailures,
    /// Session outlived the maximum age
    SessionTooOld,
}

impl std::fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepeatedFailures => write!(f, "Multiple failed attempts detected"),
            Self::SessionTooOld => write!(f, "Session too old"),
        }
    }
}

impl SessionContext {
    /// Start a session with a freshly generated id.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_id(generate_session_id(), now)
    }

    pub fn with_id(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            started_at: now,
            last_activity: now,
            failed_attempts: 0,
            rate_limit: RateLimitState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Record activity at `now`. Returns `true` if the session had gone idle.
    pub fn touch(&mut self, now: DateTime<Utc>, config: &SessionConfig) -> bool {
        let was_idle = now - self.last_activity > config.idle_timeout();
        self.last_activity = now;
        was_idle
    }

    pub fn record_failure(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
    }

    /// Check for suspicious activity patterns. Detection only, never blocks.
    pub fn check_suspicious(
        &self,
        now: DateTime<Utc>,
        config: &SessionConfig,
    ) -> Option<SuspicionReason> {
        if now - self.started_at > config.max_age() {
            Some(SuspicionReason::SessionTooOld)
        } else if self.failed_attempts > config.max_failed_attempts {
            Some(SuspicionReason::RepeatedFailures)
        } else {
            None
        }
    }

    /// Whether the session can be dropped without losing rate-limit state.
    pub fn is_stale(
        &self,
        now: DateTime<Utc>,
        session: &SessionConfig,
        rate_limit: &RateLimitConfig,
    ) -> bool {
        if now - self.started_at > session.max_age() {
            return true;
        }
        let idle = now - self.last_activity > session.idle_timeout();
        idle && !self.rate_limit.window_active(now, rate_limit.window())
    }
}

/// Generate an opaque session id (32 lowercase hex characters).
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Accept only ids shaped like [`generate_session_id`] output.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<SessionContext>>;

/// A session fetched for one request.
pub struct SessionLease {
    pub handle: SessionHandle,
    /// Whether the store already tracks this session
    pub registered: bool,
}

/// Thread-safe session registry for the HTTP adapter.
///
/// Each session sits behind its own mutex so a slow mail relay for one
/// visitor never blocks another.
#[derive(Clone)]
pub struct SessionStore {
    session_config: SessionConfig,
    rate_limit_config: RateLimitConfig,
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new(session_config: SessionConfig, rate_limit_config: RateLimitConfig) -> Self {
        Self {
            session_config,
            rate_limit_config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.session_config
    }

    /// Look up a session by client-supplied id, or start a new one.
    ///
    /// Unknown or malformed ids get a fresh id so clients cannot choose keys.
    /// A fresh session is not stored until [`SessionStore::register`].
    pub async fn get_or_create(&self, id: Option<&str>, now: DateTime<Utc>) -> SessionLease {
        if let Some(id) = id.filter(|id| is_valid_session_id(id)) {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(id) {
                return SessionLease {
                    handle: handle.clone(),
                    registered: true,
                };
            }
        }

        SessionLease {
            handle: Arc::new(Mutex::new(SessionContext::new(now))),
            registered: false,
        }
    }

    /// Start tracking a leased session, making room if the store is full.
    ///
    /// The caller must not hold the session's lock.
    pub async fn register(&self, lease: &SessionLease, now: DateTime<Utc>) {
        if lease.registered {
            return;
        }
        let id = lease.handle.lock().await.id().to_string();

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.session_config.max_sessions {
            self.evict(&mut sessions, now);
        }
        sessions.insert(id.clone(), lease.handle.clone());
        debug!(session = %id, "Session started");
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop stale sessions (should be called periodically).
    ///
    /// Sessions locked by an in-flight request are kept.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let removed = self.drop_stale(&mut sessions, now);
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Stale sessions removed");
        }
        removed
    }

    fn drop_stale(
        &self,
        sessions: &mut HashMap<String, SessionHandle>,
        now: DateTime<Utc>,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => {
                !session.is_stale(now, &self.session_config, &self.rate_limit_config)
            }
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Bring a full store below its cap.
    fn evict(&self, sessions: &mut HashMap<String, SessionHandle>, now: DateTime<Utc>) {
        let stale = self.drop_stale(sessions, now);
        let mut forced = 0;
        while sessions.len() >= self.session_config.max_sessions {
            let oldest = sessions
                .iter()
                .filter_map(|(id, handle)| {
                    handle.try_lock().ok().map(|s| (s.last_activity(), id.clone()))
                })
                .min()
                .map(|(_, id)| id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    forced += 1;
                }
                // every entry is mid-request
                None => break,
            }
        }
        warn!(
            stale,
            forced,
            capacity = self.session_config.max_sessions,
            "Session store full"
        );
    }
}
