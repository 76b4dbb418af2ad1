// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Append-only audit log of accepted submissions.
//!
//! One human-readable line per record. The file is opened, appended and
//! closed on every write; no handle outlives a request, so concurrent
//! writers each land a whole line.

use crate::model::SanitizedSubmission;
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Hex characters kept from the submission hash.
pub const SUBMISSION_ID_LEN: usize = 12;

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to open audit log {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write audit log {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Derive the correlation id for a submission.
///
/// SHA-256 over the email followed by the receive time, truncated. Equal
/// inputs give equal ids; collisions are tolerated.
pub fn submission_id(email: &str, received_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(
        received_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    let mut id = hex::encode(hasher.finalize());
    id.truncate(SUBMISSION_ID_LEN);
    id
}

/// One accepted submission.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub submission_id: String,
    pub recorded_at: DateTime<Utc>,
    pub submission: SanitizedSubmission,
}

impl AuditRecord {
    /// Render as a single line, newline included.
    ///
    /// Values are quoted with Rust string escaping so embedded newlines and
    /// quotes never split a record.
    pub fn to_line(&self) -> String {
        let s = &self.submission;
        format!(
            "[{}] id={} name={:?} email={:?} company={:?} phone={:?} project_type={:?} budget={:?} message={:?}\n",
            self.recorded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.submission_id,
            s.name(),
            s.email(),
            s.company().unwrap_or(""),
            s.phone().unwrap_or(""),
            s.project_type().label(),
            s.budget().map(|b| b.label()).unwrap_or(""),
            s.message(),
        )
    }
}

/// File-backed audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record: open, write the whole line, close.
    pub async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| AuditError::Open {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(record.to_line().as_bytes())
            .await
            .map_err(|source| AuditError::Write {
                path: self.path.clone(),
                source,
            })?;

        file.flush().await.map_err(|source| AuditError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::model::{ProjectType, SubmissionRequest};
    use crate::validator::SubmissionValidator;
    use chrono::TimeZone;

    fn record(name: &str, message: &str) -> AuditRecord {
        let request = SubmissionRequest::new(
            name,
            "ann@example.com",
            ProjectType::Consulting,
            message,
        );
        let validator = SubmissionValidator::new(ValidationConfig::default());
        let submission = validator.validate(&request).unwrap().sanitize();
        let recorded_at = Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap();
        AuditRecord {
            submission_id: submission_id(submission.email(), recorded_at),
            recorded_at,
            submission,
        }
    }

    #[test]
    fn test_submission_id_deterministic() {
        let at = Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap();
        let a = submission_id("ann@example.com", at);
        let b = submission_id("ann@example.com", at);
        assert_eq!(a, b);
        assert_eq!(a.len(), SUBMISSION_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        assert_ne!(a, submission_id("bob@example.com", at));
        assert_ne!(
            a,
            submission_id("ann@example.com", at + chrono::Duration::milliseconds(1))
        );
    }

    #[test]
    fn test_line_is_single_line() {
        let line = record("Ann", "first line\nsecond \"quoted\" line").to_line();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
        assert!(line.starts_with("[2026-02-02T10:00:00Z] id="));
        assert!(line.contains("name=\"Ann\""));
        assert!(line.contains("email=\"ann@example.com\""));
        assert!(line.contains("project_type=\"Consulting\""));
        assert!(line.contains("company=\"\""));
        assert!(line.contains(r#"message="first line\nsecond &quot;quoted&quot; line""#));
    }

    #[tokio::test]
    async fn test_append_adds_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.txt"));

        log.append(&record("Ann", "Interested in a web project")).await.unwrap();
        log.append(&record("Bob", "Need a security review")).await.unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"Ann\""));
        assert!(lines[1].contains("\"Bob\""));
    }

    #[tokio::test]
    async fn test_unwritable_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("missing").join("audit.txt"));
        let err = log
            .append(&record("Ann", "Interested in a web project"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Open { .. }));
    }
}
