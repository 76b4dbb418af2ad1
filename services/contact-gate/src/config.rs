// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact gate service.
//!
//! Every value has a default; the environment overrides field by field.
//! See [`Config::from_env`] for the variable names.

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for any configured span, in seconds (about ten years).
pub const MAX_SPAN_SECS: u64 = 10 * 365 * 24 * 3600;

/// Paths the router already serves.
const RESERVED_PATHS: &[&str] = &["/health", "/healthz", "/contact"];

/// Configuration for the contact gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-session submission limits
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Input validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Mail relay configuration
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Audit log configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Session bookkeeping configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// User-facing contact details
    #[serde(default)]
    pub contact: ContactConfig,
}

/// Per-session rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum gap between accepted submissions in seconds (default: 30)
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,

    /// Accepted submissions allowed per window (default: 3)
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Quiet time after the last submission that resets the count, in
    /// seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Validation configuration for contact submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum message length in characters, inclusive (default: 10)
    #[serde(default = "default_min_message_chars")]
    pub min_message_chars: usize,

    /// Maximum message length in characters, inclusive (default: 5000)
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Origins allowed to submit; empty disables the check
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Mail relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Send notification mail for accepted submissions (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay host
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Use implicit TLS instead of STARTTLS (default: false)
    #[serde(default)]
    pub implicit_tls: bool,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Sender mailbox, e.g. `Portfolio <noreply@example.com>`
    #[serde(default)]
    pub from: Option<String>,

    /// Recipient mailbox
    #[serde(default)]
    pub recipient: Option<String>,

    /// Delivery attempt timeout in seconds (default: 10)
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
}

/// Audit log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Append-only log file (default: contact_submissions.txt)
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

/// Session bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity before a session counts as idle, in seconds (default: 1800)
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Session age that is flagged as suspicious, in seconds (default: 86400)
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Failed attempts tolerated before the session is flagged (default: 5)
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// Sessions the HTTP adapter keeps at most (default: 10000)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Contact details surfaced to the submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Alternate channel suggested when mail delivery fails
    #[serde(default = "default_fallback_contact")]
    pub fallback_contact: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_min_interval_secs() -> u64 {
    30
}

fn default_max_per_window() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    3600
}

fn default_min_message_chars() -> usize {
    10
}

fn default_max_message_chars() -> usize {
    5000
}

fn default_smtp_port() -> u16 {
    587
}

fn default_notifier_timeout_secs() -> u64 {
    10
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("contact_submissions.txt")
}

fn default_idle_timeout_secs() -> u64 {
    1800 // 30 minutes
}

fn default_max_age_secs() -> u64 {
    86400 // 24 hours
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_fallback_contact() -> String {
    "email or WhatsApp listed on the contact page".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            notifier: NotifierConfig::default(),
            audit: AuditConfig::default(),
            session: SessionConfig::default(),
            metrics: MetricsConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_message_chars: default_min_message_chars(),
            max_message_chars: default_max_message_chars(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            implicit_tls: false,
            username: None,
            password: None,
            from: None,
            recipient: None,
            timeout_secs: default_notifier_timeout_secs(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            max_age_secs: default_max_age_secs(),
            max_failed_attempts: default_max_failed_attempts(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            fallback_contact: default_fallback_contact(),
        }
    }
}

impl RateLimitConfig {
    /// Minimum gap between accepted submissions
    pub fn min_interval(&self) -> ChronoDuration {
        span(self.min_interval_secs)
    }

    /// Rolling window length
    pub fn window(&self) -> ChronoDuration {
        span(self.window_secs)
    }
}

impl NotifierConfig {
    /// Get the delivery timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> ChronoDuration {
        span(self.idle_timeout_secs)
    }

    pub fn max_age(&self) -> ChronoDuration {
        span(self.max_age_secs)
    }
}

/// Seconds as a chrono span, capped at [`MAX_SPAN_SECS`].
fn span(secs: u64) -> ChronoDuration {
    ChronoDuration::seconds(secs.min(MAX_SPAN_SECS) as i64)
}

/// Whether `path` can be mounted next to the fixed routes.
pub fn is_valid_metrics_path(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    path.starts_with('/')
        && !trimmed.is_empty()
        && !RESERVED_PATHS.contains(&trimmed)
        && !path.contains(|c: char| matches!(c, ':' | '*' | '{' | '}') || c.is_whitespace())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
    /// - `RATE_MIN_INTERVAL_SECS`, `RATE_MAX_PER_WINDOW`, `RATE_WINDOW_SECS`
    /// - `MESSAGE_MIN_CHARS`, `MESSAGE_MAX_CHARS`
    /// - `ALLOWED_ORIGINS`: comma separated
    /// - `NOTIFIER_ENABLED`, `NOTIFIER_TIMEOUT_SECS`
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_IMPLICIT_TLS`, `SMTP_USERNAME`, `SMTP_PASSWORD`
    /// - `NOTIFY_FROM`, `NOTIFY_RECIPIENT`
    /// - `AUDIT_LOG_PATH`
    /// - `SESSION_IDLE_TIMEOUT_SECS`, `SESSION_MAX_AGE_SECS`, `SESSION_MAX_FAILED_ATTEMPTS`
    /// - `SESSION_MAX_ENTRIES`
    /// - `METRICS_ENABLED`, `METRICS_PATH`
    /// - `FALLBACK_CONTACT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup(lookup);
        let defaults = Config::default();

        Config {
            bind_addr: env.text("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                min_interval_secs: env
                    .secs("RATE_MIN_INTERVAL_SECS")
                    .unwrap_or(defaults.rate_limit.min_interval_secs),
                max_per_window: env
                    .parsed("RATE_MAX_PER_WINDOW")
                    .unwrap_or(defaults.rate_limit.max_per_window),
                window_secs: env
                    .secs("RATE_WINDOW_SECS")
                    .unwrap_or(defaults.rate_limit.window_secs),
            },
            validation: ValidationConfig {
                min_message_chars: env
                    .parsed("MESSAGE_MIN_CHARS")
                    .unwrap_or(defaults.validation.min_message_chars),
                max_message_chars: env
                    .parsed("MESSAGE_MAX_CHARS")
                    .unwrap_or(defaults.validation.max_message_chars),
                allowed_origins: env
                    .text("ALLOWED_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or(defaults.validation.allowed_origins),
            },
            notifier: NotifierConfig {
                enabled: env.flag("NOTIFIER_ENABLED").unwrap_or(defaults.notifier.enabled),
                smtp_host: env.text("SMTP_HOST"),
                smtp_port: env.parsed("SMTP_PORT").unwrap_or(defaults.notifier.smtp_port),
                implicit_tls: env
                    .flag("SMTP_IMPLICIT_TLS")
                    .unwrap_or(defaults.notifier.implicit_tls),
                username: env.text("SMTP_USERNAME"),
                password: env.text("SMTP_PASSWORD"),
                from: env.text("NOTIFY_FROM"),
                recipient: env.text("NOTIFY_RECIPIENT"),
                timeout_secs: env
                    .secs("NOTIFIER_TIMEOUT_SECS")
                    .unwrap_or(defaults.notifier.timeout_secs),
            },
            audit: AuditConfig {
                path: env
                    .text("AUDIT_LOG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.audit.path),
            },
            session: SessionConfig {
                idle_timeout_secs: env
                    .secs("SESSION_IDLE_TIMEOUT_SECS")
                    .unwrap_or(defaults.session.idle_timeout_secs),
                max_age_secs: env
                    .secs("SESSION_MAX_AGE_SECS")
                    .unwrap_or(defaults.session.max_age_secs),
                max_failed_attempts: env
                    .parsed("SESSION_MAX_FAILED_ATTEMPTS")
                    .unwrap_or(defaults.session.max_failed_attempts),
                max_sessions: env
                    .parsed::<usize>("SESSION_MAX_ENTRIES")
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.session.max_sessions),
            },
            metrics: MetricsConfig {
                enabled: env.flag("METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                path: env
                    .text("METRICS_PATH")
                    .map(|v| v.trim().to_string())
                    .filter(|v| is_valid_metrics_path(v))
                    .unwrap_or(defaults.metrics.path),
            },
            contact: ContactConfig {
                fallback_contact: env
                    .text("FALLBACK_CONTACT")
                    .unwrap_or(defaults.contact.fallback_contact),
            },
        }
    }
}

/// Typed access to a key lookup; blank values count as unset.
struct EnvLookup<F>(F);

impl<F> EnvLookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn text(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.text(key).and_then(|v| v.trim().parse().ok())
    }

    /// Seconds, rejecting spans past [`MAX_SPAN_SECS`].
    fn secs(&self, key: &str) -> Option<u64> {
        self.parsed(key).filter(|secs| *secs <= MAX_SPAN_SECS)
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.text(key).and_then(|v| parse_flag(&v))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
