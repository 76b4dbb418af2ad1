// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form data model.
//!
//! A submission moves through three shapes:
//! 1. [`SubmissionRequest`]: raw field values from the presentation layer
//! 2. [`ValidatedSubmission`]: borrowed view produced only by the validator
//! 3. [`SanitizedSubmission`]: owned, escaped copy safe for storage and relay

use crate::sanitize::sanitize_input;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project categories offered by the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    #[serde(rename = "Cybersecurity Audit / Penetration Testing")]
    CybersecurityAudit,
    #[serde(rename = "Digital Forensics & OSINT Investigation")]
    DigitalForensics,
    #[serde(rename = "Automation & Python Scripting")]
    Automation,
    #[serde(rename = "AI/ML Project")]
    AiMl,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile App")]
    MobileApp,
    #[serde(rename = "Consulting")]
    Consulting,
    #[serde(rename = "Other")]
    Other,
}

impl ProjectType {
    /// All categories, in form order.
    pub const ALL: [ProjectType; 8] = [
        Self::CybersecurityAudit,
        Self::DigitalForensics,
        Self::Automation,
        Self::AiMl,
        Self::WebDevelopment,
        Self::MobileApp,
        Self::Consulting,
        Self::Other,
    ];

    /// Label shown on the form and written to the audit log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CybersecurityAudit => "Cybersecurity Audit / Penetration Testing",
            Self::DigitalForensics => "Digital Forensics & OSINT Investigation",
            Self::Automation => "Automation & Python Scripting",
            Self::AiMl => "AI/ML Project",
            Self::WebDevelopment => "Web Development",
            Self::MobileApp => "Mobile App",
            Self::Consulting => "Consulting",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Budget ranges offered by the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "< Rp5.000.000")]
    UnderFiveMillion,
    #[serde(rename = "Rp5.000.000 - Rp15.000.000")]
    FiveToFifteenMillion,
    #[serde(rename = "Rp15.000.000 - Rp50.000.000")]
    FifteenToFiftyMillion,
    #[serde(rename = "Rp50.000.000+")]
    OverFiftyMillion,
    #[serde(rename = "Let's discuss")]
    LetsDiscuss,
}

impl Budget {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderFiveMillion => "< Rp5.000.000",
            Self::FiveToFifteenMillion => "Rp5.000.000 - Rp15.000.000",
            Self::FifteenToFiftyMillion => "Rp15.000.000 - Rp50.000.000",
            Self::OverFiftyMillion => "Rp50.000.000+",
            Self::LetsDiscuss => "Let's discuss",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw contact form input.
///
/// Absent strings deserialize as empty; the validator treats blank values
/// as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub budget: Option<Budget>,
}

impl SubmissionRequest {
    /// Build a request with only the mandatory fields set.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        project_type: ProjectType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            project_type: Some(project_type),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// A request that passed every format check.
///
/// Only [`crate::validator::SubmissionValidator::validate`] constructs this,
/// so a [`SanitizedSubmission`] can never come from unvalidated input.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSubmission<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) company: Option<&'a str>,
    pub(crate) phone: Option<&'a str>,
    pub(crate) project_type: ProjectType,
    pub(crate) message: &'a str,
    pub(crate) budget: Option<Budget>,
}

impl ValidatedSubmission<'_> {
    pub fn email(&self) -> &str {
        self.email
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Escape every free-text field.
    pub fn sanitize(&self) -> SanitizedSubmission {
        SanitizedSubmission {
            name: sanitize_input(self.name),
            email: sanitize_input(self.email),
            company: self.company.map(sanitize_input),
            phone: self.phone.map(sanitize_input),
            project_type: self.project_type,
            message: sanitize_input(self.message),
            budget: self.budget,
        }
    }
}

/// Escaped submission, safe to render, relay, or store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedSubmission {
    name: String,
    email: String,
    company: Option<String>,
    phone: Option<String>,
    project_type: ProjectType,
    message: String,
    budget: Option<Budget>,
}

impl SanitizedSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn budget(&self) -> Option<Budget> {
        self.budget
    }
}
