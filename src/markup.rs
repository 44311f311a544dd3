// 🧩 Markup helpers - escaping, fragments, plain-text rendering
//
// Canned responses are trusted markup (they carry citation links and
// highlight spans). Anything a user typed goes through `escape`.

use serde::Serialize;

/// Blinking cursor appended while a panel is "typing"
pub const TYPING_CURSOR: &str = r#"<span class="typing-cursor"></span>"#;

/// Spinner shown in a panel while a response "loads"
pub const SPINNER: &str =
    r#"<div class="spinner" style="width: 32px; height: 32px; margin: 40px auto;"></div>"#;

/// An HTML fragment addressed to a container element id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub target: String,
    pub html: String,
}

impl Fragment {
    pub fn new(target: impl Into<String>, html: impl Into<String>) -> Self {
        Fragment {
            target: target.into(),
            html: html.into(),
        }
    }
}

/// "Analyzing..." panel shown while an artificial delay runs
pub fn loader(kind: &str, title: &str, subtitle: &str, steps: usize) -> String {
    let dots: String = (0..steps)
        .map(|i| format!(r#"<span class="loader-step" data-step="{}"></span>"#, i))
        .collect();
    format!(
        r#"<div class="loader loader-{}"><div class="spinner"></div><h4 class="loader-title">{}</h4><p class="loader-subtitle">{}</p><div class="loader-steps">{}</div></div>"#,
        kind, title, subtitle, dots
    )
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `class` when the condition holds, otherwise an empty string
pub fn class_if(condition: bool, class: &'static str) -> &'static str {
    if condition {
        class
    } else {
        ""
    }
}

/// Drop tags and decode the handful of entities the templates use.
///
/// Used by terminal surfaces, which cannot render markup.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&times;", "×")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs left behind by template indentation
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_strip_tags() {
        let html = r#"Remote work <span class="citation-link" data-source="1.1">1</span> allowed"#;
        assert_eq!(strip_tags(html), "Remote work 1 allowed");
        assert_eq!(strip_tags("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(strip_tags(TYPING_CURSOR), "");
    }

    #[test]
    fn test_loader() {
        let html = loader("compliance", "Analyzing Content", "Checking...", 4);
        assert!(html.starts_with(r#"<div class="loader loader-compliance">"#));
        assert_eq!(html.matches("loader-step\"").count(), 4);
        assert_eq!(strip_tags(&html), "Analyzing ContentChecking...");
    }

    #[test]
    fn test_class_if() {
        assert_eq!(class_if(true, "active"), "active");
        assert_eq!(class_if(false, "active"), "");
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  a\n   b\t c "), "a b c");
    }
}
