// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Untrusted text sanitization.
//!
//! Applied to every free-text field before it is relayed or stored:
//! - `<script>` blocks are dropped with their content
//! - any other tag is dropped, content kept
//! - `javascript:` and `on<event>=` fragments are removed
//! - `& < > " ' /` are HTML-escaped
//!
//! The output is a fixed point: sanitizing it again returns it unchanged.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Entities produced by [`escape_html`]. An `&` that already starts one of
/// these is left alone.
const ENTITIES: &[&str] = &["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;", "&#x2F;"];

fn script_block() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script\s*>").expect("script pattern compiles")
    })
}

fn html_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"))
}

fn script_fragment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)javascript\s*:|\bon\w+\s*=").expect("fragment pattern compiles")
    })
}

/// Sanitize a single untrusted string.
pub fn sanitize_input(text: &str) -> String {
    let without_scripts = script_block().replace_all(text, "");
    let without_tags = html_tag().replace_all(&without_scripts, "");
    let defused = strip_script_fragments(&without_tags);
    escape_html(&defused).trim().to_string()
}

/// Remove `javascript:` and inline handler fragments until none remain.
///
/// A single pass is not enough: `javajavascript:script:` collapses into a
/// fresh match once the inner fragment is gone.
fn strip_script_fragments(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        match script_fragment().replace_all(&current, "") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}

/// HTML-escape markup-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if starts_with_entity(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c => out.push(c),
        }
    }
    out
}

fn starts_with_entity(text: &str) -> bool {
    ENTITIES.iter().any(|entity| text.starts_with(entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(
            sanitize_input("Interested in a web project"),
            "Interested in a web project"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize_input("  Ann \n"), "Ann");
    }

    #[test]
    fn test_script_block_removed_with_content() {
        let out = sanitize_input("Hello<script>alert('x')</script> world");
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn test_script_block_case_and_multiline() {
        let out = sanitize_input("a<SCRIPT type=\"text/javascript\">\nsteal()\n</Script>b");
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_tags_stripped_text_kept() {
        assert_eq!(sanitize_input("<b>bold</b> move"), "bold move");
    }

    #[test]
    fn test_javascript_scheme_removed() {
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("javajavascript:script:go()"), "go()");
    }

    #[test]
    fn test_inline_handlers_removed() {
        assert_eq!(sanitize_input("x onerror=boom"), "x boom");
        assert_eq!(sanitize_input("x ONCLICK = boom"), "x  boom");
    }

    #[test]
    fn test_special_characters_escaped() {
        assert_eq!(
            sanitize_input(r#"Tom & "Jerry's" a/b 1 < 2"#),
            "Tom &amp; &quot;Jerry&#x27;s&quot; a&#x2F;b 1 &lt; 2"
        );
    }

    #[test]
    fn test_existing_entities_preserved() {
        assert_eq!(sanitize_input("fish &amp; chips"), "fish &amp; chips");
        assert_eq!(sanitize_input("&copy;"), "&amp;copy;");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "plain",
            "Tom & Jerry",
            "<script>alert(1)</script>hi",
            "<img src=x onerror=alert(1)>",
            "a < b > c",
            "<>",
            "&amp;&lt;&",
            "'quoted' \"double\" /slash/",
            "javascript:void(0)",
            "  spaced out  ",
            "onion=rings",
            "Halo, saya tertarik dengan layanan Anda 🚀",
        ];

        for input in inputs {
            let once = sanitize_input(input);
            let twice = sanitize_input(&once);
            assert_eq!(once, twice, "sanitize not idempotent for {:?}", input);
        }
    }
}
