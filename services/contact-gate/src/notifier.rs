// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail relay notification for accepted submissions.
//!
//! Delivery is best effort: one attempt, bounded by a timeout, never
//! retried. The gate treats every [`DeliveryError`] as a degraded success.

use crate::config::NotifierConfig;
use crate::model::SanitizedSubmission;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Notification delivery error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Notifier disabled")]
    Disabled,

    #[error("Notifier misconfigured: {0}")]
    Misconfigured(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Structured message handed to a notifier.
#[derive(Debug, Clone)]
pub struct ContactNotification {
    pub submission_id: String,
    pub received_at: DateTime<Utc>,
    pub submission: SanitizedSubmission,
}

impl ContactNotification {
    pub fn subject(&self) -> String {
        format!(
            "New contact form submission: {}",
            self.submission.project_type()
        )
    }

    /// Plain-text body listing every field.
    pub fn render_body(&self) -> String {
        let s = &self.submission;
        let mut body = String::new();
        body.push_str("New contact form submission\n\n");
        body.push_str(&format!("Reference: {}\n", self.submission_id));
        body.push_str(&format!("Received:  {}\n\n", self.received_at.to_rfc3339()));
        body.push_str(&format!("Name:         {}\n", s.name()));
        body.push_str(&format!("Email:        {}\n", s.email()));
        body.push_str(&format!("Company:      {}\n", s.company().unwrap_or("-")));
        body.push_str(&format!("Phone:        {}\n", s.phone().unwrap_or("-")));
        body.push_str(&format!("Project type: {}\n", s.project_type()));
        body.push_str(&format!(
            "Budget:       {}\n\n",
            s.budget().map(|b| b.label()).unwrap_or("-")
        ));
        body.push_str("Message:\n");
        body.push_str(s.message());
        body.push('\n');
        body
    }
}

/// Delivery capability injected into the gate.
pub trait Notifier: Send + Sync {
    /// Attempt delivery once. `Ok` means the relay accepted the message.
    fn deliver(
        &self,
        notification: &ContactNotification,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// SMTP notifier over an authenticated relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipient: Mailbox,
    timeout: Duration,
}

impl SmtpNotifier {
    /// Build a notifier from configuration.
    ///
    /// No connection is made until the first delivery.
    pub fn new(config: &NotifierConfig) -> Result<Self, DeliveryError> {
        let host = required(config.smtp_host.as_deref(), "SMTP host")?;
        let username = required(config.username.as_deref(), "SMTP username")?;
        let password = required(config.password.as_deref(), "SMTP password")?;
        let from = parse_mailbox(required(config.from.as_deref(), "sender address")?)?;
        let recipient =
            parse_mailbox(required(config.recipient.as_deref(), "recipient address")?)?;

        let builder = if config.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        };
        let builder =
            builder.map_err(|e| DeliveryError::Misconfigured(format!("SMTP relay error: {e}")))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            transport,
            from,
            recipient,
            timeout: config.timeout(),
        })
    }
}

impl Notifier for SmtpNotifier {
    async fn deliver(&self, notification: &ContactNotification) -> Result<(), DeliveryError> {
        let email = compose_message(&self.from, &self.recipient, notification)?;

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(response)) => {
                debug!(
                    submission_id = %notification.submission_id,
                    code = %response.code(),
                    "Notification accepted by relay"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(DeliveryError::Transport(e.to_string())),
            Err(_) => Err(DeliveryError::Timeout(self.timeout)),
        }
    }
}

/// Notifier selected at startup.
#[derive(Clone)]
pub enum MailNotifier {
    Disabled,
    Smtp(SmtpNotifier),
}

impl MailNotifier {
    /// Build from configuration; an incomplete configuration disables mail.
    pub fn from_config(config: &NotifierConfig) -> Self {
        if !config.enabled {
            info!("Mail notifier disabled");
            return Self::Disabled;
        }

        match SmtpNotifier::new(config) {
            Ok(notifier) => {
                info!(
                    host = ?config.smtp_host,
                    port = config.smtp_port,
                    implicit_tls = config.implicit_tls,
                    "Mail notifier enabled"
                );
                Self::Smtp(notifier)
            }
            Err(e) => {
                warn!(error = %e, "Mail notifier misconfigured, running without mail delivery");
                Self::Disabled
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Smtp(_))
    }
}

impl Notifier for MailNotifier {
    async fn deliver(&self, notification: &ContactNotification) -> Result<(), DeliveryError> {
        match self {
            Self::Disabled => Err(DeliveryError::Disabled),
            Self::Smtp(smtp) => smtp.deliver(notification).await,
        }
    }
}

/// Build the notification mail. Replies go to the submitter.
pub fn compose_message(
    from: &Mailbox,
    recipient: &Mailbox,
    notification: &ContactNotification,
) -> Result<Message, DeliveryError> {
    let submission = &notification.submission;
    let address: Address =
        submission
            .email()
            .parse()
            .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidAddress {
                address: submission.email().to_string(),
                reason: e.to_string(),
            })?;
    let reply_to = Mailbox::new(Some(submission.name().to_string()), address);

    Message::builder()
        .from(from.clone())
        .reply_to(reply_to)
        .to(recipient.clone())
        .subject(notification.subject())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.render_body())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, DeliveryError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DeliveryError::Misconfigured(format!("missing {what}")))
}

fn parse_mailbox(value: &str) -> Result<Mailbox, DeliveryError> {
    value
        .parse()
        .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidAddress {
            address: value.to_string(),
            reason: e.to_string(),
        })
}
